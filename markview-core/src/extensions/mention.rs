//! `@name` and `@name/sub` references
//!
//! A mention must not touch a word character or backtick on either side (so e-mail addresses
//! and code-ish text are left alone) and is never recognized inside a link label.

use super::{push_text, rewrite_lists, SyntaxExtension};
use crate::ast::Node;
use regex::Regex;
use std::sync::LazyLock;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+(?:/\w+)?)").unwrap());

pub struct Mentions;

impl SyntaxExtension for Mentions {
    fn name(&self) -> &str {
        "mention"
    }

    fn apply(&self, root: &mut Node) {
        rewrite_lists(root, &rewrite_mentions, &|node: &Node| {
            !matches!(node, Node::Link { .. } | Node::Html(_) | Node::Code { .. })
        });
    }
}

/// Internal path a mention of `name` links to
pub fn mention_target(name: &str) -> String {
    format!("/{name}")
}

fn rewrite_mentions(children: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    for node in children {
        match node {
            Node::Text(text) => split_mentions(&text, &mut out),
            other => out.push(other),
        }
    }
    out
}

fn split_mentions(text: &str, out: &mut Vec<Node>) {
    let mut last = 0;
    for caps in MENTION.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if before.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '`') {
            continue;
        }
        if after.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '`' || c == '/') {
            continue;
        }
        push_text(out, &text[last..whole.start()]);
        out.push(Node::Mention {
            name: name.as_str().to_string(),
            target: mention_target(name.as_str()),
        });
        last = whole.end();
    }
    push_text(out, &text[last..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn mention(name: &str) -> Node {
        Node::Mention {
            name: name.to_string(),
            target: format!("/{name}"),
        }
    }

    #[test]
    fn finds_mentions_in_text() {
        assert_eq!(
            parse("hi @alice and @bob/posts!"),
            Node::Root(vec![Node::Paragraph(vec![
                Node::text("hi "),
                mention("alice"),
                Node::text(" and "),
                mention("bob/posts"),
                Node::text("!"),
            ])])
        );
    }

    #[test]
    fn email_like_text_is_not_a_mention() {
        assert_eq!(
            parse("write to me at x@y"),
            Node::Root(vec![Node::Paragraph(vec![Node::text("write to me at x@y")])])
        );
    }

    #[test]
    fn deep_paths_are_not_mentions() {
        assert_eq!(
            parse("@a/b/c"),
            Node::Root(vec![Node::Paragraph(vec![Node::text("@a/b/c")])])
        );
    }

    #[test]
    fn no_mentions_in_code_or_links() {
        assert_eq!(
            parse("`@code` [@label](https://x.test)"),
            Node::Root(vec![Node::Paragraph(vec![
                Node::InlineCode("@code".into()),
                Node::text(" "),
                Node::Link {
                    url: "https://x.test".into(),
                    title: String::new(),
                    children: vec![Node::text("@label")],
                },
            ])])
        );
    }

    #[test]
    fn mention_inside_emphasis() {
        assert_eq!(
            parse("*@carol*"),
            Node::Root(vec![Node::Paragraph(vec![Node::Emphasis(vec![mention(
                "carol"
            )])])])
        );
    }
}
