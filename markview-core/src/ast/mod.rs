//! Document tree and traversal
//!
//! - [`nodes`]: the tagged [`Node`] enum produced by the parser
//! - [`visit`]: the shared walker plus the URL extractor and containment test built on it

pub mod nodes;
pub mod visit;

pub use nodes::{Alignment, Directive, DirectiveKind, Node};
pub use visit::{contains, extract_urls, walk, walk_mut, Walk};
