//! Output format trait
//!
//! A format turns a finished [`RenderTree`] into text. Formats never look at markdown or the
//! document tree, only at what the render mapper produced, so every behaviour decided there
//! (ids, link policy, image detection, zoom) shows up identically in each output.

use crate::error::FormatError;
use crate::render::RenderTree;

/// Trait for render tree output formats
///
/// # Examples
///
/// ```ignore
/// struct Headings;
///
/// impl RenderFormat for Headings {
///     fn name(&self) -> &str {
///         "headings"
///     }
///
///     fn serialize(&self, tree: &RenderTree) -> Result<String, FormatError> {
///         Ok(tree
///             .headings()
///             .iter()
///             .filter_map(|h| h.id.clone())
///             .collect::<Vec<_>>()
///             .join("\n"))
///     }
/// }
/// ```
pub trait RenderFormat: Send + Sync {
    /// The name of this format (e.g., "html", "json")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn serialize(&self, tree: &RenderTree) -> Result<String, FormatError>;
}
