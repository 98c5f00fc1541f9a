//! Directive transform pass
//!
//! Runs once after parsing. Every directive whose name has a registered handler (and whose
//! kind the handler accepts) is replaced by whatever the handler returns. Other directives
//! and every other node are left untouched, so a consumer can still see them and decide.
//!
//! The built-in registry knows one handler, `high`, which turns text and leaf directives
//! into [`Node::Highlight`]. Since handlers replace the directive node, re-running the pass
//! on its own output finds nothing left to rewrite.

use crate::ast::{walk_mut, Directive, DirectiveKind, Node, Walk};
use std::collections::HashMap;

/// Rewrites one directive name into a render instruction
pub trait DirectiveHandler: Send + Sync {
    /// Directive name this handler is registered under
    fn name(&self) -> &str;

    /// Whether this handler applies to directives of `kind`
    fn accepts(&self, _kind: DirectiveKind) -> bool {
        true
    }

    /// Replacement node for `directive`
    fn rewrite(&self, directive: Directive) -> Node;
}

/// `:high[...]` and `::high[...]` become highlighted spans
pub struct HighlightDirective;

impl DirectiveHandler for HighlightDirective {
    fn name(&self) -> &str {
        "high"
    }

    fn accepts(&self, kind: DirectiveKind) -> bool {
        matches!(kind, DirectiveKind::Text | DirectiveKind::Leaf)
    }

    fn rewrite(&self, directive: Directive) -> Node {
        Node::Highlight(directive.children)
    }
}

/// Registry of directive handlers keyed by directive name
pub struct DirectiveRegistry {
    handlers: HashMap<String, Box<dyn DirectiveHandler>>,
}

impl DirectiveRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        DirectiveRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Registry with the built-in handlers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(HighlightDirective);
        registry
    }

    /// Register a handler, replacing any handler with the same name
    pub fn register<H: DirectiveHandler + 'static>(&mut self, handler: H) {
        self.handlers
            .insert(handler.name().to_string(), Box::new(handler));
    }

    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered handler names (sorted)
    pub fn list_handlers(&self) -> Vec<String> {
        let mut names: Vec<_> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    fn handler_for(&self, directive: &Directive) -> Option<&dyn DirectiveHandler> {
        self.handlers
            .get(&directive.name)
            .map(|handler| handler.as_ref())
            .filter(|handler| handler.accepts(directive.kind))
    }

    /// Apply every registered handler throughout `root`
    pub fn apply(&self, root: &mut Node) {
        let _ = walk_mut(root, &mut |node| {
            let Node::Directive(directive) = node else {
                return Walk::Continue;
            };
            if let Some(handler) = self.handler_for(directive) {
                let placeholder = Node::Root(Vec::new());
                if let Node::Directive(owned) = std::mem::replace(node, placeholder) {
                    *node = handler.rewrite(owned);
                }
            }
            Walk::Continue
        });
    }
}

impl Default for DirectiveRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Run the default directive handlers over `root`
pub fn transform(root: &mut Node) {
    DirectiveRegistry::with_defaults().apply(root);
}
