//! Tokenizer for tagged JVM log lines.
//!
//! Expects logs written with only the `tags` decorator, e.g.
//! `-Xlog:cds*,scc*:file=app.log:tags`, which produces lines such as
//! `[cds,heap] Clearing root 12: was 0x00000007ffe7afc0`.

use thiserror::Error;

/// A line without any resolvable `[tag,...]` group.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no tag delimiter found")]
pub struct TagDelimiterNotFound;

/// One tokenized log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Tags in source order; duplicates are kept.
    pub tags: Vec<String>,
    /// Everything after the tag group, trimmed.
    pub message: String,
}

impl LogLine {
    /// Split a raw line into its tag group and message.
    ///
    /// The tag group is the rightmost bracket pair whose content is a
    /// comma-separated list of tag tokens. Message bodies may carry stray
    /// brackets (array descriptors such as `[Ljava.lang.String;`), so a
    /// candidate `[` without a closing `]` ahead of the next `[` is skipped
    /// and the scan continues further left.
    pub fn parse(line: &str) -> Result<LogLine, TagDelimiterNotFound> {
        // Exclusive upper bound for both the next `[` candidate and its `]`.
        let mut limit = line.len();

        while let Some(open) = line[..limit].rfind('[') {
            if let Some(offset) = line[open + 1..limit].find(']') {
                let close = open + 1 + offset;
                if let Some(tags) = split_tags(&line[open + 1..close]) {
                    return Ok(LogLine {
                        tags,
                        message: line[close + 1..].trim().to_string(),
                    });
                }
            }
            limit = open;
        }

        Err(TagDelimiterNotFound)
    }

    /// Returns `true` when every tag in `required` is present on this line.
    pub fn contains_tags(&self, required: &[&str]) -> bool {
        required
            .iter()
            .all(|tag| self.tags.iter().any(|t| t == tag))
    }
}

/// Split the inside of a bracket pair into trimmed tags.
///
/// Returns `None` unless every token is a non-empty identifier.
fn split_tags(inner: &str) -> Option<Vec<String>> {
    inner
        .split(',')
        .map(str::trim)
        .map(|tag| {
            let valid = !tag.is_empty()
                && tag
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            valid.then(|| tag.to_string())
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(line: &LogLine) -> Vec<&str> {
        line.tags.iter().map(String::as_str).collect()
    }

    // ── parse ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_simple_line() {
        let line = LogLine::parse("[cds,heap] Clearing root R1: 0x10").unwrap();
        assert_eq!(tags(&line), vec!["cds", "heap"]);
        assert_eq!(line.message, "Clearing root R1: 0x10");
    }

    #[test]
    fn test_parse_trims_tags_and_message() {
        let line = LogLine::parse("[cds , unshareable ]   restore: Foo  ").unwrap();
        assert_eq!(tags(&line), vec!["cds", "unshareable"]);
        assert_eq!(line.message, "restore: Foo");
    }

    #[test]
    fn test_parse_skips_unmatched_bracket_in_message() {
        let line =
            LogLine::parse("[cds,unshareable ] remove java_mirror: [Ljava.lang.String;").unwrap();
        assert_eq!(tags(&line), vec!["cds", "unshareable"]);
        assert_eq!(line.message, "remove java_mirror: [Ljava.lang.String;");
    }

    #[test]
    fn test_parse_skips_several_unmatched_brackets() {
        let line = LogLine::parse("[cds,mirror] Recreate mirror for [[I and [B").unwrap();
        assert_eq!(tags(&line), vec!["cds", "mirror"]);
        assert_eq!(line.message, "Recreate mirror for [[I and [B");
    }

    #[test]
    fn test_parse_skips_bracket_pair_that_is_not_a_tag_list() {
        let line = LogLine::parse("[cds] resolved [a b] entry").unwrap();
        assert_eq!(tags(&line), vec!["cds"]);
        assert_eq!(line.message, "resolved [a b] entry");
    }

    #[test]
    fn test_parse_uses_rightmost_group_after_decorations() {
        let line = LogLine::parse("[0.012s][info][scc,nmethod] 427 (L2): Reading nmethod").unwrap();
        assert_eq!(tags(&line), vec!["scc", "nmethod"]);
        assert_eq!(line.message, "427 (L2): Reading nmethod");
    }

    #[test]
    fn test_parse_keeps_duplicate_tags() {
        let line = LogLine::parse("[cds,cds,heap] x").unwrap();
        assert_eq!(tags(&line), vec!["cds", "cds", "heap"]);
    }

    #[test]
    fn test_parse_empty_message() {
        let line = LogLine::parse("[cds]").unwrap();
        assert_eq!(tags(&line), vec!["cds"]);
        assert_eq!(line.message, "");
    }

    #[test]
    fn test_parse_without_brackets_fails() {
        assert_eq!(
            LogLine::parse("no tags on this line"),
            Err(TagDelimiterNotFound)
        );
    }

    #[test]
    fn test_parse_only_unmatched_brackets_fails() {
        assert!(LogLine::parse("[Ljava.lang.Object; and [I").is_err());
    }

    #[test]
    fn test_parse_empty_brackets_fails() {
        assert!(LogLine::parse("[] message").is_err());
    }

    // ── contains_tags ─────────────────────────────────────────────────────────

    #[test]
    fn test_contains_tags_subset() {
        let line = LogLine::parse("[cds,heap,mirror] Restored Foo archived mirror 0x1").unwrap();
        assert!(line.contains_tags(&["cds", "heap"]));
        assert!(line.contains_tags(&["mirror"]));
        assert!(!line.contains_tags(&["cds", "vtables"]));
    }
}
