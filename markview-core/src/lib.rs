//! Markdown rendering pipeline for user-authored text
//!
//!     This crate turns markdown written by users into a render tree: a structure in which
//!     every presentation decision has been made (heading anchors, safe links, inline images,
//!     highlighted search terms, zoomable images). Output formats then serialize that tree.
//!
//!     TLDR:
//!         - `render(text, &options)` is the one-call entry point.
//!         - Anything that owns state across renders (image probes, zoom, anchor copy) goes
//!           through `render::view::DocumentView`.
//!         - This is a pure lib: no stdout, no env vars, no global subscriber. The CLI and
//!           any other host decide about those.
//!
//! Architecture
//!
//!     raw text → parser (comrak + syntax extensions) → document tree → transform pass
//!              → render mapper (+ slugger, image classification, highlighter) → render tree
//!              → format (html / json / treeviz)
//!
//!     URL extraction feeds the image classifier on the side. The classifier is the only
//!     asynchronous component; everything else is synchronous and total.
//!
//!     The file structure :
//!     .
//!     ├── ast                    # Document tree and the generic walker
//!     ├── parser                 # comrak → document tree
//!     ├── extensions             # block directives, tildes, text directives, mentions
//!     ├── transforms.rs          # directive handlers (`high` → highlight)
//!     ├── marks.rs               # highlight markers in raw strings
//!     ├── slug.rs                # heading slugs
//!     ├── classify               # image classifier and probes
//!     ├── highlight.rs           # syntax highlighting capability
//!     ├── render                 # render tree, mapper, zoom, anchors, document view
//!     ├── format.rs              # RenderFormat trait
//!     ├── registry.rs            # FormatRegistry
//!     └── formats                # html, json, treeviz
//!
//! Testing
//!     tests
//!     ├── lib.rs                 # includes the modules below
//!     ├── end_to_end.rs
//!     ├── classify.rs
//!     └── properties.rs
//!
//!     Rust does not discover tests in subdirectories, so tests/lib.rs declares them.
//!
//! Malformed input
//!
//!     There is no parse error. Broken directive, mention or tilde syntax stays literal text,
//!     a failed image probe is the `errored` state and renders as a plain link. The only
//!     fallible operations are output serialization and starting probes without a runtime.

pub mod ast;
pub mod classify;
pub mod error;
pub mod extensions;
pub mod format;
pub mod formats;
pub mod highlight;
pub mod marks;
pub mod parser;
pub mod registry;
pub mod render;
pub mod slug;
pub mod transforms;

pub use ast::{contains, extract_urls, Node};
pub use classify::{Classification, ImageClassifier, ImageUrlPattern, UrlState};
pub use error::{ClassifyError, FormatError, ProbeError};
pub use format::RenderFormat;
pub use parser::parse;
pub use registry::FormatRegistry;
pub use render::view::DocumentView;
pub use render::{render, render_with, RenderOptions, RenderTree};
pub use transforms::transform;

use std::collections::BTreeSet;

/// Whether any node of the parsed `markdown` satisfies `predicate`
///
/// ```ignore
/// assert!(md_has("see ![x](/x.png)", Node::is_image));
/// ```
pub fn md_has(markdown: &str, predicate: impl FnMut(&Node) -> bool) -> bool {
    contains(&parse(markdown), predicate)
}

/// Distinct link targets of `markdown`
pub fn extract_urls_from_markdown(markdown: &str) -> BTreeSet<String> {
    extract_urls(&parse(markdown))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md_has_images() {
        assert!(md_has("see ![x](/x.png)", Node::is_image));
        assert!(!md_has("see [x](/x.png)", Node::is_image));
    }

    #[test]
    fn urls_from_markdown() {
        let urls = extract_urls_from_markdown("[a](/a) [b](/b) [a again](/a) ![i](/i.png)");
        assert_eq!(urls.into_iter().collect::<Vec<_>>(), vec!["/a", "/b"]);
    }
}
