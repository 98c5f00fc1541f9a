//! Highlight markers in raw strings
//!
//! Most highlights are structural: the `high` directive becomes [`Node::Highlight`]. Code text
//! and link targets are not parsed for directives, so a marker written there survives as raw
//! characters (`:high[x]` in code, `:high%5Bx%5D` once a URL has been percent-encoded). The
//! helpers here find those markers again so both raw-text paths share one definition.

use crate::ast::Node;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::LazyLock;

static MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":high\[([^\]]+)\]").unwrap());

static ESCAPED_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i):high%5B(.+?)%5D").unwrap());

/// A run of text that is either marked or plain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkedSegment {
    pub text: String,
    pub marked: bool,
}

impl MarkedSegment {
    pub fn plain(text: impl Into<String>) -> Self {
        MarkedSegment {
            text: text.into(),
            marked: false,
        }
    }

    pub fn marked(text: impl Into<String>) -> Self {
        MarkedSegment {
            text: text.into(),
            marked: true,
        }
    }
}

/// Split `text` at every `:high[...]` marker. Empty plain runs are dropped.
pub fn split_marks(text: &str) -> Vec<MarkedSegment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in MARK.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(MarkedSegment::plain(&text[last..whole.start()]));
        }
        segments.push(MarkedSegment::marked(inner.as_str()));
        last = whole.end();
    }
    if last < text.len() {
        segments.push(MarkedSegment::plain(&text[last..]));
    }
    segments
}

/// `text` with every marker replaced by its content
pub fn strip_marks(text: &str) -> String {
    MARK.replace_all(text, "$1").into_owned()
}

/// Marker-free text plus the byte ranges (into that text) that were marked
pub fn mark_ranges(text: &str) -> (String, Vec<Range<usize>>) {
    let mut stripped = String::with_capacity(text.len());
    let mut ranges = Vec::new();
    for segment in split_marks(text) {
        let start = stripped.len();
        stripped.push_str(&segment.text);
        if segment.marked {
            ranges.push(start..stripped.len());
        }
    }
    (stripped, ranges)
}

/// Remove percent-encoded markers from a URL, keeping their content
pub fn strip_escaped_marks(href: &str) -> String {
    ESCAPED_MARK.replace_all(href, "$1").into_owned()
}

/// Text and highlight nodes for a label that may contain raw markers
pub fn expand_marks(text: &str) -> Vec<Node> {
    split_marks(text)
        .into_iter()
        .map(|segment| {
            if segment.marked {
                Node::Highlight(vec![Node::Text(segment.text)])
            } else {
                Node::Text(segment.text)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_finds_markers() {
        assert_eq!(
            split_marks("let :high[x] = 1;"),
            vec![
                MarkedSegment::plain("let "),
                MarkedSegment::marked("x"),
                MarkedSegment::plain(" = 1;"),
            ]
        );
    }

    #[test]
    fn unterminated_marker_is_plain() {
        assert_eq!(
            split_marks(":high[oops"),
            vec![MarkedSegment::plain(":high[oops")]
        );
        assert_eq!(split_marks(":high[]"), vec![MarkedSegment::plain(":high[]")]);
    }

    #[test]
    fn ranges_point_into_stripped_text() {
        let (text, ranges) = mark_ranges("a:high[bc]d:high[e]");
        assert_eq!(text, "abcde");
        assert_eq!(ranges, vec![1..3, 4..5]);
    }

    #[test]
    fn escaped_markers_are_stripped_from_urls() {
        assert_eq!(
            strip_escaped_marks("https://x.test/:high%5Bfoo%5D/bar"),
            "https://x.test/foo/bar"
        );
        assert_eq!(
            strip_escaped_marks("https://x.test/:high%5bfoo%5d"),
            "https://x.test/foo"
        );
        assert_eq!(strip_escaped_marks("https://x.test/"), "https://x.test/");
    }

    #[test]
    fn expand_builds_highlight_nodes() {
        assert_eq!(
            expand_marks("see :high[this]"),
            vec![
                Node::text("see "),
                Node::Highlight(vec![Node::text("this")])
            ]
        );
    }
}
