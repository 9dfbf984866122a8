//! Tag-set classification into handling categories.

use crate::line::LogLine;

/// The handler a log line is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Vtables,
    Heap,
    Mirror,
    Unshareable,
    SccInit,
    Scc,
    /// No category matched; the line only feeds the lookback buffer.
    Unclassified,
}

impl Category {
    /// Categories in the order they are tested. The first match wins, so
    /// `[cds,heap,mirror]` is a heap line and `[scc,init]` never reaches `Scc`.
    pub const PRIORITY: [Category; 6] = [
        Category::Vtables,
        Category::Heap,
        Category::Mirror,
        Category::Unshareable,
        Category::SccInit,
        Category::Scc,
    ];

    /// Tags a line must carry (at least) to match this category.
    pub fn required_tags(self) -> &'static [&'static str] {
        match self {
            Category::Vtables => &["cds", "vtables"],
            Category::Heap => &["cds", "heap"],
            Category::Mirror => &["cds", "mirror"],
            Category::Unshareable => &["cds", "unshareable"],
            Category::SccInit => &["scc", "init"],
            Category::Scc => &["scc"],
            Category::Unclassified => &[],
        }
    }

    /// Pick the first category in [`Category::PRIORITY`] whose required tags
    /// are all present on `line`.
    pub fn classify(line: &LogLine) -> Category {
        Self::PRIORITY
            .into_iter()
            .find(|category| line.contains_tags(category.required_tags()))
            .unwrap_or(Category::Unclassified)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vtables => "vtables",
            Category::Heap => "heap",
            Category::Mirror => "mirror",
            Category::Unshareable => "unshareable",
            Category::SccInit => "scc-init",
            Category::Scc => "scc",
            Category::Unclassified => "none",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
