//! Syntax extensions
//!
//!     The base grammar is CommonMark with GFM tables and autolinks (see [`crate::parser`]).
//!     Everything else is layered on top of the converted tree by passes implementing
//!     [`SyntaxExtension`]:
//!
//!     - [`directive::BlockDirectives`]: `::name[label]{attrs}` lines and `:::name` … `:::`
//!       containers
//!     - [`tilde::Tildes`]: `~~strike~~` and `~sub~`
//!     - [`directive::TextDirectives`]: `:name[label]{attrs}` inside text
//!     - [`mention::Mentions`]: `@name` and `@name/sub`
//!
//!     Order matters: block directives look at whole paragraph lines before any inline pass has
//!     split their text, and mentions run last so they never fire inside a directive name or
//!     attribute block.
//!
//!     Passes never fail. Input they cannot make sense of is left as text.

pub mod directive;
pub mod mention;
pub mod tilde;

use crate::ast::Node;

/// A tree rewrite that adds syntax on top of the base grammar
pub trait SyntaxExtension: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, root: &mut Node);
}

/// Ordered collection of syntax extensions
pub struct ExtensionSet {
    extensions: Vec<Box<dyn SyntaxExtension>>,
}

impl ExtensionSet {
    /// A set with no extensions: plain CommonMark + GFM
    pub fn empty() -> Self {
        ExtensionSet {
            extensions: Vec::new(),
        }
    }

    /// Directives, tildes and mentions in their required order
    pub fn standard() -> Self {
        Self::empty()
            .with(directive::BlockDirectives)
            .with(tilde::Tildes)
            .with(directive::TextDirectives)
            .with(mention::Mentions)
    }

    pub fn with<E: SyntaxExtension + 'static>(mut self, extension: E) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    pub fn apply(&self, root: &mut Node) {
        for extension in &self.extensions {
            tracing::trace!(extension = extension.name(), "applying syntax extension");
            extension.apply(root);
        }
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Append `text` to `out`, merging into a trailing text node
pub(crate) fn push_text(out: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Node::Text(text.to_string()));
    }
}

/// Append `node`, merging text nodes and dropping empty ones
pub(crate) fn push_node(out: &mut Vec<Node>, node: Node) {
    match node {
        Node::Text(text) => push_text(out, &text),
        other => out.push(other),
    }
}

/// Merge adjacent text nodes throughout the tree
pub(crate) fn normalize_text(node: &mut Node) {
    if let Some(children) = node.children_mut() {
        let mut merged = Vec::with_capacity(children.len());
        for child in std::mem::take(children) {
            push_node(&mut merged, child);
        }
        for child in merged.iter_mut() {
            normalize_text(child);
        }
        *children = merged;
    }
}

/// Apply `rewrite` to every child list in the tree, parent before children.
///
/// Subtrees for which `descend` returns false are neither rewritten nor entered.
pub(crate) fn rewrite_lists<R, D>(node: &mut Node, rewrite: &R, descend: &D)
where
    R: Fn(Vec<Node>) -> Vec<Node>,
    D: Fn(&Node) -> bool,
{
    if !descend(node) {
        return;
    }
    if let Some(children) = node.children_mut() {
        *children = rewrite(std::mem::take(children));
        for child in children.iter_mut() {
            rewrite_lists(child, rewrite, descend);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_text_merges() {
        let mut out = vec![Node::text("a")];
        push_text(&mut out, "b");
        push_text(&mut out, "");
        out.push(Node::SoftBreak);
        push_text(&mut out, "c");
        assert_eq!(
            out,
            vec![Node::text("ab"), Node::SoftBreak, Node::text("c")]
        );
    }

    #[test]
    fn normalize_merges_nested_lists() {
        let mut root = Node::Root(vec![Node::Paragraph(vec![
            Node::text("a"),
            Node::text("["),
            Node::Emphasis(vec![Node::text("b"), Node::text("c")]),
            Node::text(""),
        ])]);
        normalize_text(&mut root);
        assert_eq!(
            root,
            Node::Root(vec![Node::Paragraph(vec![
                Node::text("a["),
                Node::Emphasis(vec![Node::text("bc")]),
            ])])
        );
    }

    #[test]
    fn standard_order() {
        assert_eq!(
            ExtensionSet::standard().names(),
            vec!["block-directive", "tilde", "text-directive", "mention"]
        );
    }
}
