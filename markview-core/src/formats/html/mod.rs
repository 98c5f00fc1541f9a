//! HTML format implementation
//!
//! # Library Choice
//!
//! The render tree is written into a `markup5ever_rcdom` DOM and serialized with `html5ever`.
//! The serializer does all escaping, so raw HTML from the markdown source (kept as text by
//! the mapper) can never turn into markup.
//!
//! # Element Mapping Table
//!
//! | Render node   | HTML                                                                |
//! |---------------|---------------------------------------------------------------------|
//! | Root          | `<div class="text">`                                                |
//! | Heading       | `<div class="heading"><hN id=..>` + optional `<a class="heading-link">` |
//! | Element       | the element's tag, classes and attributes                          |
//! | CodeBlock     | `<div class="code-block" data-language=..><pre><code>` one `span.line` per line |
//! | InlineCode    | `<code>` with `<mark>` for marked segments                         |
//! | Link          | `<a href target="_blank" rel=..>` (internal links: `href` only)    |
//! | Image         | `<img src alt style data-image-index data-zoom>`                    |
//! | Fragment      | children inlined                                                    |
//!
//! # Output
//!
//! By default a standalone page with `css/markview.css` embedded. [`HtmlFormat::fragment`]
//! emits only the `div.text` element, for embedding.

mod serializer;

pub use serializer::{serialize_fragment, serialize_page};

use crate::error::FormatError;
use crate::format::RenderFormat;
use crate::render::RenderTree;

/// Stylesheet embedded in standalone pages
pub fn default_css() -> &'static str {
    include_str!("../../../css/markview.css")
}

/// Format implementation for HTML
#[derive(Debug, Clone)]
pub struct HtmlFormat {
    standalone: bool,
    custom_css: Option<String>,
}

impl Default for HtmlFormat {
    fn default() -> Self {
        HtmlFormat {
            standalone: true,
            custom_css: None,
        }
    }
}

impl HtmlFormat {
    /// Emit only the `div.text` element
    pub fn fragment() -> Self {
        HtmlFormat {
            standalone: false,
            custom_css: None,
        }
    }

    /// Append `css` after the default stylesheet of standalone pages
    pub fn with_custom_css(mut self, css: impl Into<String>) -> Self {
        self.custom_css = Some(css.into());
        self
    }
}

impl RenderFormat for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML5 page with embedded CSS"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn serialize(&self, tree: &RenderTree) -> Result<String, FormatError> {
        if !self.standalone {
            return serialize_fragment(tree);
        }
        let css = match &self.custom_css {
            Some(custom) => format!("{}\n{custom}", default_css()),
            None => default_css().to_string(),
        };
        serialize_page(tree, &css)
    }
}
