//! Syntax highlighting capability
//!
//! The render mapper hands code text and a language hint to a [`CodeHighlighter`] and gets
//! back styled lines. Concatenating the span texts of a line gives back that line exactly, so
//! highlight-marker ranges computed on the raw text can be laid over the styled spans
//! afterwards with [`overlay_marks`].

use serde::Serialize;
use std::ops::Range;
use std::sync::LazyLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// A run of code text sharing one style
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledSpan {
    pub text: String,
    /// Foreground colour as `#rrggbb`, `None` for unstyled text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    /// Inside a highlight marker
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub marked: bool,
}

impl StyledSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        StyledSpan {
            text: text.into(),
            color: None,
            bold: false,
            italic: false,
            marked: false,
        }
    }

    fn with_text(&self, text: &str) -> Self {
        StyledSpan {
            text: text.to_string(),
            ..self.clone()
        }
    }
}

/// One source line, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedLine {
    pub number: usize,
    pub spans: Vec<StyledSpan>,
}

impl HighlightedLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// "Render this code with this language hint"
pub trait CodeHighlighter: Send + Sync {
    fn highlight(&self, code: &str, language: Option<&str>) -> Vec<HighlightedLine>;
}

/// No styling at all: one plain span per non-empty line
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl CodeHighlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: Option<&str>) -> Vec<HighlightedLine> {
        code.split('\n')
            .enumerate()
            .map(|(index, line)| HighlightedLine {
                number: index + 1,
                spans: if line.is_empty() {
                    Vec::new()
                } else {
                    vec![StyledSpan::plain(line)]
                },
            })
            .collect()
    }
}

/// Highlighting with syntect's bundled syntaxes and themes
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

static DEFAULT_HIGHLIGHTER: LazyLock<SyntectHighlighter> =
    LazyLock::new(|| SyntectHighlighter::new(DEFAULT_THEME));

impl SyntectHighlighter {
    /// Highlighter using the bundled theme `theme`, or the default theme if there is no such
    /// theme.
    pub fn new(theme: &str) -> Self {
        let mut themes = ThemeSet::load_defaults();
        let theme = match themes.themes.remove(theme) {
            Some(found) => found,
            None => {
                tracing::warn!(theme, "unknown highlight theme, using {DEFAULT_THEME}");
                themes.themes.remove(DEFAULT_THEME).unwrap_or_default()
            }
        };
        SyntectHighlighter {
            syntaxes: SyntaxSet::load_defaults_nonewlines(),
            theme,
        }
    }

    /// Process-wide instance with the default theme. Loading syntaxes is slow, so callers
    /// that render often share this one.
    pub fn shared() -> &'static SyntectHighlighter {
        &DEFAULT_HIGHLIGHTER
    }

    /// Names of the bundled themes
    pub fn theme_names() -> Vec<String> {
        let mut names: Vec<String> = ThemeSet::load_defaults().themes.into_keys().collect();
        names.sort();
        names
    }

    fn span(style: Style, text: &str) -> StyledSpan {
        let fg = style.foreground;
        StyledSpan {
            text: text.to_string(),
            color: Some(format!("#{:02x}{:02x}{:02x}", fg.r, fg.g, fg.b)),
            bold: style.font_style.contains(FontStyle::BOLD),
            italic: style.font_style.contains(FontStyle::ITALIC),
            marked: false,
        }
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        SyntectHighlighter::new(DEFAULT_THEME)
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: Option<&str>) -> Vec<HighlightedLine> {
        let syntax = language
            .and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        code.split('\n')
            .enumerate()
            .map(|(index, line)| {
                let spans = match highlighter.highlight_line(line, &self.syntaxes) {
                    Ok(ranges) => ranges
                        .into_iter()
                        .filter(|(_, text)| !text.is_empty())
                        .map(|(style, text)| Self::span(style, text))
                        .collect(),
                    Err(err) => {
                        tracing::debug!(error = %err, line = index + 1, "highlighting failed");
                        if line.is_empty() {
                            Vec::new()
                        } else {
                            vec![StyledSpan::plain(line)]
                        }
                    }
                };
                HighlightedLine {
                    number: index + 1,
                    spans,
                }
            })
            .collect()
    }
}

/// Flag every part of `lines` covered by `ranges` as marked.
///
/// Ranges are byte offsets into the text the lines were produced from, with lines joined by
/// `\n`. Spans crossing a range boundary are split.
pub fn overlay_marks(lines: Vec<HighlightedLine>, ranges: &[Range<usize>]) -> Vec<HighlightedLine> {
    if ranges.is_empty() {
        return lines;
    }

    let mut offset = 0;
    lines
        .into_iter()
        .map(|line| {
            let mut spans = Vec::with_capacity(line.spans.len());
            for span in line.spans {
                let start = offset;
                offset += span.text.len();
                split_span(&span, start, ranges, &mut spans);
            }
            // the newline joining this line to the next
            offset += 1;
            HighlightedLine {
                number: line.number,
                spans,
            }
        })
        .collect()
}

fn split_span(span: &StyledSpan, start: usize, ranges: &[Range<usize>], out: &mut Vec<StyledSpan>) {
    let end = start + span.text.len();
    let mut cuts = vec![start, end];
    for range in ranges {
        for point in [range.start, range.end] {
            if point > start && point < end && span.text.is_char_boundary(point - start) {
                cuts.push(point);
            }
        }
    }
    cuts.sort_unstable();
    cuts.dedup();

    for window in cuts.windows(2) {
        let (from, to) = (window[0], window[1]);
        let mut piece = span.with_text(&span.text[from - start..to - start]);
        piece.marked = span.marked || ranges.iter().any(|r| r.start <= from && to <= r.end);
        out.push(piece);
    }
}
