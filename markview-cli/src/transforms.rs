//! CLI-specific transforms
//!
//! This module defines the inspect views available in the CLI. Each transform is a
//! stage + format combination (e.g., "ast-treeviz", "render-json").
//!
//! ## Transform Pipeline
//!
//! 1. **Parsing** - Raw text → document tree (comrak + directives, tildes, mentions),
//!    then the directive transform pass
//!    - `ast-json`: document tree as JSON
//!    - `ast-treeviz`: document tree visualization with Unicode icons
//!
//! 2. **Classification** - Link targets → image / not an image
//!    - `urls`: distinct link targets, one per line
//!    - `classify-json`: state of every link target (extension match only, nothing is probed)
//!
//! 3. **Rendering** - Document tree → render tree
//!    - `render-json`, `render-treeviz`, `render-html` (fragment, no page around it)

use markview_core::formats::html::HtmlFormat;
use markview_core::formats::json::JsonFormat;
use markview_core::formats::treeviz::{ast_to_treeviz_str, to_treeviz_str};
use markview_core::highlight::{CodeHighlighter, PlainHighlighter};
use markview_core::render::render_document;
use markview_core::{
    extract_urls, parse, transform, Classification, ImageUrlPattern, Node, RenderFormat,
    RenderOptions, RenderTree,
};

/// All available CLI transforms (stage + format combinations)
pub const AVAILABLE_TRANSFORMS: &[&str] = &[
    "ast-json",
    "ast-treeviz",
    "urls",
    "classify-json",
    "render-json",
    "render-treeviz",
    "render-html",
];

/// Everything a transform needs besides the source text
pub struct TransformSettings<'a> {
    pub options: RenderOptions,
    pub pattern: ImageUrlPattern,
    pub highlighter: &'a dyn CodeHighlighter,
}

impl Default for TransformSettings<'static> {
    fn default() -> Self {
        TransformSettings {
            options: RenderOptions::default(),
            pattern: ImageUrlPattern::default(),
            highlighter: &PlainHighlighter,
        }
    }
}

/// Parse and transform `source`
pub fn parse_document(source: &str) -> Node {
    let mut document = parse(source);
    transform(&mut document);
    document
}

/// Render `source` with link targets classified by extension only
pub fn render_tree(source: &str, settings: &TransformSettings) -> RenderTree {
    let document = parse_document(source);
    let classification = Classification::seeded(extract_urls(&document), &settings.pattern);
    render_document(
        &document,
        &settings.options,
        &classification,
        settings.highlighter,
    )
}

/// Execute a named transform on a source text
///
/// # Examples
///
/// ```ignore
/// let output = execute_transform("# Hi", "render-treeviz", &TransformSettings::default())?;
/// ```
pub fn execute_transform(
    source: &str,
    transform_name: &str,
    settings: &TransformSettings,
) -> Result<String, String> {
    match transform_name {
        "ast-json" => serde_json::to_string_pretty(&parse_document(source))
            .map_err(|e| format!("JSON serialization failed: {e}")),
        "ast-treeviz" => Ok(ast_to_treeviz_str(&parse_document(source))),
        "urls" => {
            let mut output = String::new();
            for url in extract_urls(&parse_document(source)) {
                output.push_str(&url);
                output.push('\n');
            }
            Ok(output)
        }
        "classify-json" => {
            let urls = extract_urls(&parse_document(source));
            let classification = Classification::seeded(urls, &settings.pattern);
            serde_json::to_string_pretty(&classification.snapshot())
                .map_err(|e| format!("JSON serialization failed: {e}"))
        }
        "render-json" => JsonFormat
            .serialize(&render_tree(source, settings))
            .map_err(|e| e.to_string()),
        "render-treeviz" => Ok(to_treeviz_str(&render_tree(source, settings))),
        "render-html" => HtmlFormat::fragment()
            .serialize(&render_tree(source, settings))
            .map_err(|e| e.to_string()),
        _ => Err(format!("Unknown transform: {transform_name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, name: &str) -> String {
        execute_transform(source, name, &TransformSettings::default()).expect("transform to run")
    }

    #[test]
    fn every_listed_transform_runs() {
        let source = "# Title\n\nsee [pic](https://x.test/a.png) and @ann :high[hit]\n";
        for name in AVAILABLE_TRANSFORMS {
            assert!(
                execute_transform(source, name, &TransformSettings::default()).is_ok(),
                "{name} failed"
            );
        }
    }

    #[test]
    fn unknown_transform_is_an_error() {
        let result = execute_transform("x", "token-json", &TransformSettings::default());
        assert_eq!(result, Err("Unknown transform: token-json".to_string()));
    }

    #[test]
    fn urls_are_distinct_and_sorted() {
        let output = run("[b](/b) [a](https://x.test/a.png) [b again](/b)", "urls");
        assert_eq!(output, "/b\nhttps://x.test/a.png\n");
    }

    #[test]
    fn classify_json_uses_pattern() {
        let output = run("[a](https://x.test/a.png) [b](https://x.test/b)", "classify-json");
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["https://x.test/a.png"], "loaded");
        assert_eq!(json["https://x.test/b"], "loading");
    }

    #[test]
    fn ast_json_shows_transformed_tree() {
        let output = run(":high[hit]", "ast-json");
        assert!(output.contains("\"highlight\""));
        assert!(!output.contains("\"directive\""));
    }

    #[test]
    fn render_transforms_follow_options() {
        let settings = TransformSettings {
            options: RenderOptions {
                top_level: false,
                ..RenderOptions::default()
            },
            ..TransformSettings::default()
        };
        let output = execute_transform("# Title", "render-treeviz", &settings).unwrap();
        assert!(output.contains("§ h3 #title"));
    }

    #[test]
    fn render_html_is_a_fragment() {
        let output = run("hi", "render-html");
        assert_eq!(output, "<div class=\"text\"><p>hi</p></div>");
    }
}
