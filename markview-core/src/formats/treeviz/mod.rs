//! Treeviz formatter
//!
//! Treeviz is a visual representation of a tree, one node per line:
//!
//! <prefix><connector> <icon> <label> (labels truncated to 30 characters)
//!
//! Example (render tree of `# Hi\n\nsee @ann`):
//!
//!   ⧉ div.text
//!   ├─ § h1 #hi
//!   │ └─ ◦ "Hi"
//!   └─ ¶ p
//!     ├─ ◦ "see "
//!     └─ ⊕ /ann
//!       └─ ◦ "@ann"
//!
//! Both the parsed document ([`ast_to_treeviz_str`]) and the render tree
//! ([`to_treeviz_str`]) can be printed. Icons come from [`super::icons`].

use super::icons::get_icon;
use crate::ast::Node;
use crate::error::FormatError;
use crate::format::RenderFormat;
use crate::render::zoom::ZoomState;
use crate::render::{RenderNode, RenderTree};

const LABEL_WIDTH: usize = 30;

/// A node the tree printer can show
trait TreeItem: Sized {
    fn icon(&self) -> &'static str;
    fn label(&self) -> String;
    fn items(&self) -> &[Self];
}

impl TreeItem for Node {
    fn icon(&self) -> &'static str {
        get_icon(self.node_type())
    }

    fn label(&self) -> String {
        match self {
            Node::Root(children) => format!("Root ({} blocks)", children.len()),
            Node::Heading { level, .. } => format!("h{level} {}", self.to_plain_text()),
            Node::List { ordered, start, children } => {
                let kind = if *ordered {
                    format!("ordered from {start}")
                } else {
                    "bullet".to_string()
                };
                format!("{kind}, {} items", children.len())
            }
            Node::Code { lang, value } => format!(
                "{} ({} lines)",
                lang.as_deref().unwrap_or("plain"),
                value.lines().count()
            ),
            Node::Html(raw) => quoted(raw),
            Node::Table { alignments, rows } => {
                format!("{} columns, {} rows", alignments.len(), rows.len())
            }
            Node::TableRow { header: true, .. } => "header".to_string(),
            Node::Text(text) | Node::InlineCode(text) => quoted(text),
            Node::Link { url, .. } => url.clone(),
            Node::Image { url, alt, .. } => format!("{url} [{alt}]"),
            Node::Mention { name, target } => format!("@{name} → {target}"),
            Node::Directive(directive) => {
                let mut label = format!("{} {}", directive.kind.as_str(), directive.name);
                for (key, value) in &directive.attributes {
                    label.push_str(&format!(" {key}={value}"));
                }
                label
            }
            other => other.node_type().to_string(),
        }
    }

    fn items(&self) -> &[Node] {
        self.children()
    }
}

impl TreeItem for RenderNode {
    fn icon(&self) -> &'static str {
        get_icon(self.kind())
    }

    fn label(&self) -> String {
        match self {
            RenderNode::Element(element) => {
                let mut label = element.tag.as_str().to_string();
                for class in &element.classes {
                    label.push('.');
                    label.push_str(class);
                }
                for (name, value) in &element.attributes {
                    label.push_str(&format!(" {name}={value}"));
                }
                label
            }
            RenderNode::Text(text) => quoted(text),
            RenderNode::Heading(heading) => match &heading.id {
                Some(id) => format!("h{} #{id}", heading.level),
                None => format!("h{}", heading.level),
            },
            RenderNode::CodeBlock(code) => format!(
                "{} ({} lines)",
                code.language.as_deref().unwrap_or("plain"),
                code.lines.len()
            ),
            RenderNode::InlineCode(_) => quoted(&self.text_content()),
            RenderNode::Link(link) => match link.rel {
                Some(rel) => format!("{} ({})", link.href, rel.as_str()),
                None => link.href.clone(),
            },
            RenderNode::Image(image) => {
                let zoom = match image.zoom {
                    ZoomState::Fitted => "fitted",
                    ZoomState::Expanded => "expanded",
                };
                format!("{} [{zoom}]", image.src)
            }
            RenderNode::Fragment(children) => format!("fragment ({})", children.len()),
        }
    }

    fn items(&self) -> &[RenderNode] {
        self.children()
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\n', "↵"))
}

fn truncate(label: &str) -> String {
    if label.chars().count() <= LABEL_WIDTH {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(LABEL_WIDTH - 1).collect();
        short.push('…');
        short
    }
}

fn format_item<T: TreeItem>(item: &T, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    output.push_str(&format!(
        "{prefix}{connector} {} {}\n",
        item.icon(),
        truncate(&item.label())
    ));
    let child_prefix = format!("{prefix}{}", if is_last { "  " } else { "│ " });
    format_children(item.items(), &child_prefix, output);
}

fn format_children<T: TreeItem>(children: &[T], prefix: &str, output: &mut String) {
    for (i, child) in children.iter().enumerate() {
        format_item(child, prefix, i == children.len() - 1, output);
    }
}

fn format_root<T: TreeItem>(root: &T) -> String {
    let mut output = format!("{} {}\n", root.icon(), truncate(&root.label()));
    format_children(root.items(), "", &mut output);
    output
}

/// Render tree as treeviz text
pub fn to_treeviz_str(tree: &RenderTree) -> String {
    format_root(&tree.root)
}

/// Parsed document as treeviz text
pub fn ast_to_treeviz_str(document: &Node) -> String {
    format_root(document)
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl RenderFormat for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn serialize(&self, tree: &RenderTree) -> Result<String, FormatError> {
        Ok(to_treeviz_str(tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::highlight::PlainHighlighter;
    use crate::parser::parse;
    use crate::render::{render_with, RenderOptions};

    #[test]
    fn test_render_tree() {
        let tree = render_with(
            "# Hi\n\nsee @ann",
            &RenderOptions::default(),
            &Classification::default(),
            &PlainHighlighter,
        );
        insta::assert_snapshot!(to_treeviz_str(&tree), @r###"
        ⧉ div.text
        ├─ § h1 #hi
        │ └─ ◦ "Hi"
        └─ ¶ p
          ├─ ◦ "see "
          └─ ⊕ /ann
            └─ ◦ "@ann"
        "###);
    }

    #[test]
    fn test_ast_tree() {
        let document = parse("- a\n- b :x[y]{k=v}");
        insta::assert_snapshot!(ast_to_treeviz_str(&document), @r###"
        ⧉ Root (1 blocks)
        └─ ☰ bullet, 2 items
          ├─ • ListItem
          │ └─ ¶ Paragraph
          │   └─ ◦ "a"
          └─ • ListItem
            └─ ¶ Paragraph
              ├─ ◦ "b "
              └─ ⁝ text x k=v
                └─ ◦ "y"
        "###);
    }

    #[test]
    fn test_truncation() {
        let label = truncate(&"x".repeat(40));
        assert_eq!(label.chars().count(), LABEL_WIDTH);
        assert!(label.ends_with('…'));
    }
}
