//! Output format implementations
//!
//! Every format serializes a finished render tree.

pub mod html;
pub mod icons;
pub mod json;
pub mod treeviz;

pub use html::HtmlFormat;
pub use json::JsonFormat;
pub use treeviz::TreevizFormat;
