use std::collections::VecDeque;

/// Number of recent messages kept for correlation.
pub const LOOKBACK_CAPACITY: usize = 10;

/// Fixed-capacity ring of the most recent messages, newest first.
#[derive(Debug, Clone)]
pub struct LookbackBuffer {
    messages: VecDeque<String>,
}

impl LookbackBuffer {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::with_capacity(LOOKBACK_CAPACITY + 1),
        }
    }

    /// Push a message as the newest entry, evicting the oldest past capacity.
    pub fn push(&mut self, message: String) {
        self.messages.push_front(message);
        if self.messages.len() > LOOKBACK_CAPACITY {
            self.messages.pop_back();
        }
    }

    /// The message processed immediately before the current one.
    pub fn latest(&self) -> Option<&str> {
        self.messages.front().map(String::as_str)
    }

    /// Messages from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for LookbackBuffer {
    fn default() -> Self {
        Self::new()
    }
}
