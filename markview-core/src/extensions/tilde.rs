//! Strikethrough and subscript
//!
//! `~~x~~` becomes [`Node::Delete`], `~x~` becomes [`Node::Subscript`]. Runs of three or more
//! tildes are literal. A run can open when the next character is not whitespace and close
//! when the previous one is not whitespace, the same flanking idea CommonMark uses for
//! emphasis. Delimiters pair only within one sibling list, but everything between them
//! (including other inline nodes) becomes the new node's children.

use super::{push_node, push_text, rewrite_lists, SyntaxExtension};
use crate::ast::Node;

pub struct Tildes;

impl SyntaxExtension for Tildes {
    fn name(&self) -> &str {
        "tilde"
    }

    fn apply(&self, root: &mut Node) {
        rewrite_lists(root, &rewrite_tildes, &|node: &Node| {
            !matches!(node, Node::Html(_) | Node::Code { .. }) && !is_autolink(node)
        });
    }
}

/// A link whose only text is its own url, as produced by `<url>` or a bare autolinked url
fn is_autolink(node: &Node) -> bool {
    match node {
        Node::Link { url, children, .. } => match children.as_slice() {
            [Node::Text(text)] => text == url || url.strip_prefix("mailto:") == Some(text.as_str()),
            _ => false,
        },
        _ => false,
    }
}

enum Item {
    Node(Node),
    Run {
        len: usize,
        can_open: bool,
        can_close: bool,
    },
}

fn rewrite_tildes(children: Vec<Node>) -> Vec<Node> {
    let items = tokenize(children);
    if !items.iter().any(|item| matches!(item, Item::Run { .. })) {
        return into_nodes(items);
    }

    let mut out: Vec<Item> = Vec::new();
    // Indices into `out` of runs that may still open
    let mut openers: Vec<usize> = Vec::new();
    for item in items {
        let (len, can_open, can_close) = match item {
            Item::Run {
                len,
                can_open,
                can_close,
            } => (len, can_open, can_close),
            node => {
                out.push(node);
                continue;
            }
        };

        if can_close {
            let matched = openers.iter().rposition(|&index| {
                matches!(out.get(index), Some(Item::Run { len: l, .. }) if *l == len)
            });
            if let Some(position) = matched {
                let index = openers[position];
                openers.truncate(position);
                let inner: Vec<Item> = out.drain(index + 1..).collect();
                out.pop();
                let children = into_nodes(inner);
                out.push(Item::Node(if len == 2 {
                    Node::Delete(children)
                } else {
                    Node::Subscript(children)
                }));
                continue;
            }
        }
        if can_open {
            openers.push(out.len());
        }
        out.push(Item::Run {
            len,
            can_open,
            can_close,
        });
    }
    into_nodes(out)
}

/// Split text nodes into plain text and tilde runs of length one or two
fn tokenize(children: Vec<Node>) -> Vec<Item> {
    let count = children.len();
    let mut previous_is_space = true;
    let mut items = Vec::new();
    let mut nodes = children.into_iter().enumerate().peekable();
    while let Some((index, node)) = nodes.next() {
        let text = match node {
            Node::Text(text) => text,
            other => {
                previous_is_space = matches!(other, Node::SoftBreak | Node::Break);
                items.push(Item::Node(other));
                continue;
            }
        };
        // A following non-text sibling counts as non-whitespace content
        let next_is_space = match nodes.peek() {
            Some((_, Node::SoftBreak | Node::Break)) => true,
            Some(_) => false,
            None => index + 1 == count,
        };

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut plain_start = 0;
        let mut i = 0;
        while i < chars.len() {
            if chars[i].1 != '~' {
                i += 1;
                continue;
            }
            let start = chars[i].0;
            let mut j = i;
            while j < chars.len() && chars[j].1 == '~' {
                j += 1;
            }
            let len = j - i;
            let end = chars.get(j).map_or(text.len(), |(offset, _)| *offset);

            if len <= 2 {
                let before = if i == 0 {
                    None
                } else {
                    Some(chars[i - 1].1)
                };
                let after = chars.get(j).map(|(_, c)| *c);
                let prev_space = before.map_or(previous_is_space, char::is_whitespace);
                let next_space = after.map_or(next_is_space, char::is_whitespace);

                if plain_start < start {
                    items.push(Item::Node(Node::Text(text[plain_start..start].to_string())));
                }
                items.push(Item::Run {
                    len,
                    can_open: !next_space,
                    can_close: !prev_space,
                });
                plain_start = end;
            }
            i = j;
        }
        if plain_start < text.len() {
            items.push(Item::Node(Node::Text(text[plain_start..].to_string())));
        }
        previous_is_space = text.chars().last().map_or(previous_is_space, char::is_whitespace);
    }
    items
}

fn into_nodes(items: Vec<Item>) -> Vec<Node> {
    let mut nodes = Vec::new();
    for item in items {
        match item {
            Item::Node(node) => push_node(&mut nodes, node),
            Item::Run { len, .. } => push_text(&mut nodes, &"~".repeat(len)),
        }
    }
    nodes
}
