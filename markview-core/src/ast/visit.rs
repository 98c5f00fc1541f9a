//! Generic preorder traversal
//!
//! One walker shared by every stage that needs to look at the whole tree: URL extraction, the
//! containment test and the directive transform pass. The callback decides how the walk
//! proceeds after each node.

use super::nodes::Node;
use std::collections::BTreeSet;
use std::ops::ControlFlow;

/// What the walker does after visiting a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Descend into the node's children
    Continue,
    /// Do not descend, continue with the next sibling
    SkipChildren,
    /// Abort the whole walk
    Stop,
}

/// Visit `node` and its descendants in document order.
///
/// Returns `ControlFlow::Break(())` if the callback stopped the walk.
pub fn walk<'a, F>(node: &'a Node, visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&'a Node) -> Walk,
{
    match visit(node) {
        Walk::Stop => return ControlFlow::Break(()),
        Walk::SkipChildren => return ControlFlow::Continue(()),
        Walk::Continue => {}
    }
    for child in node.children() {
        walk(child, visit)?;
    }
    ControlFlow::Continue(())
}

/// Mutable preorder walk. The callback may replace the node it receives; the walk then
/// descends into the replacement's children.
pub fn walk_mut<F>(node: &mut Node, visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&mut Node) -> Walk,
{
    match visit(node) {
        Walk::Stop => return ControlFlow::Break(()),
        Walk::SkipChildren => return ControlFlow::Continue(()),
        Walk::Continue => {}
    }
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            walk_mut(child, visit)?;
        }
    }
    ControlFlow::Continue(())
}

/// True as soon as one node satisfies `predicate`. Visits nothing after the first match.
pub fn contains<P>(root: &Node, mut predicate: P) -> bool
where
    P: FnMut(&Node) -> bool,
{
    walk(root, &mut |node| {
        if predicate(node) {
            Walk::Stop
        } else {
            Walk::Continue
        }
    })
    .is_break()
}

/// Distinct link targets referenced by the document
pub fn extract_urls(root: &Node) -> BTreeSet<String> {
    let mut urls = BTreeSet::new();
    let _ = walk(root, &mut |node| {
        if let Node::Link { url, .. } = node {
            urls.insert(url.clone());
        }
        Walk::Continue
    });
    urls
}
