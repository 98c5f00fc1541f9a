//! Document tree node types
//!
//!     The tree is a single tagged enum. Containers own their children directly, so a parsed
//!     document is one owned value that a render pass borrows (or a transform pass mutates in
//!     place) without any arena or reference counting.
//!
//!     Serialized with adjacent tagging, so `Node::Text("hi")` becomes
//!     `{"type": "text", "value": "hi"}`. The `ast-json` inspect transform prints exactly this.

use serde::{Deserialize, Serialize};

/// Column alignment of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

/// The three syntactic forms a directive can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    /// `:name[label]{attrs}` inside a paragraph
    Text,
    /// `::name[label]{attrs}` alone on a line
    Leaf,
    /// `:::name` … `:::` wrapping block content
    Container,
}

impl DirectiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveKind::Text => "text",
            DirectiveKind::Leaf => "leaf",
            DirectiveKind::Container => "container",
        }
    }
}

/// A named, attributed node produced by the directive extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub name: String,
    /// Attributes in source order. `#id` is stored as `("id", ..)`, classes are joined into
    /// one `("class", ..)` entry and a bare key maps to an empty value.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Directive {
    pub fn new(kind: DirectiveKind, name: impl Into<String>, children: Vec<Node>) -> Self {
        Directive {
            kind,
            name: name.into(),
            attributes: Vec::new(),
            children,
        }
    }

    /// First value recorded for `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A node of the parsed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Node {
    Root(Vec<Node>),
    Heading {
        level: u8,
        children: Vec<Node>,
    },
    Paragraph(Vec<Node>),
    BlockQuote(Vec<Node>),
    List {
        ordered: bool,
        start: usize,
        children: Vec<Node>,
    },
    ListItem(Vec<Node>),
    ThematicBreak,
    /// Fenced or indented code block. `lang` is the raw info string.
    Code {
        lang: Option<String>,
        value: String,
    },
    /// Raw HTML, block or inline. Never interpreted.
    Html(String),
    Table {
        alignments: Vec<Alignment>,
        rows: Vec<Node>,
    },
    TableRow {
        header: bool,
        cells: Vec<Node>,
    },
    TableCell(Vec<Node>),
    Text(String),
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    Delete(Vec<Node>),
    Subscript(Vec<Node>),
    InlineCode(String),
    SoftBreak,
    Break,
    Link {
        url: String,
        title: String,
        children: Vec<Node>,
    },
    Image {
        url: String,
        title: String,
        alt: String,
    },
    /// `@name` reference. `target` is the internal path it links to.
    Mention {
        name: String,
        target: String,
    },
    Directive(Directive),
    /// Emphasized span produced by the `high` directive handler
    Highlight(Vec<Node>),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    /// Children in document order. Leaves return an empty slice.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root(children)
            | Node::Paragraph(children)
            | Node::BlockQuote(children)
            | Node::ListItem(children)
            | Node::TableCell(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Delete(children)
            | Node::Subscript(children)
            | Node::Highlight(children)
            | Node::Heading { children, .. }
            | Node::List { children, .. }
            | Node::Link { children, .. } => children,
            Node::Table { rows, .. } => rows,
            Node::TableRow { cells, .. } => cells,
            Node::Directive(directive) => &directive.children,
            Node::ThematicBreak
            | Node::Code { .. }
            | Node::Html(_)
            | Node::Text(_)
            | Node::InlineCode(_)
            | Node::SoftBreak
            | Node::Break
            | Node::Image { .. }
            | Node::Mention { .. } => &[],
        }
    }

    /// Mutable access to the child list, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(children)
            | Node::Paragraph(children)
            | Node::BlockQuote(children)
            | Node::ListItem(children)
            | Node::TableCell(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Delete(children)
            | Node::Subscript(children)
            | Node::Highlight(children)
            | Node::Heading { children, .. }
            | Node::List { children, .. }
            | Node::Link { children, .. } => Some(children),
            Node::Table { rows, .. } => Some(rows),
            Node::TableRow { cells, .. } => Some(cells),
            Node::Directive(directive) => Some(&mut directive.children),
            _ => None,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Node::Link { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Node::Image { .. })
    }

    /// Stable name of the variant, used by the tree visualizer
    pub fn node_type(&self) -> &'static str {
        match self {
            Node::Root(_) => "Root",
            Node::Heading { .. } => "Heading",
            Node::Paragraph(_) => "Paragraph",
            Node::BlockQuote(_) => "BlockQuote",
            Node::List { .. } => "List",
            Node::ListItem(_) => "ListItem",
            Node::ThematicBreak => "ThematicBreak",
            Node::Code { .. } => "Code",
            Node::Html(_) => "Html",
            Node::Table { .. } => "Table",
            Node::TableRow { .. } => "TableRow",
            Node::TableCell(_) => "TableCell",
            Node::Text(_) => "Text",
            Node::Emphasis(_) => "Emphasis",
            Node::Strong(_) => "Strong",
            Node::Delete(_) => "Delete",
            Node::Subscript(_) => "Subscript",
            Node::InlineCode(_) => "InlineCode",
            Node::SoftBreak => "SoftBreak",
            Node::Break => "Break",
            Node::Link { .. } => "Link",
            Node::Image { .. } => "Image",
            Node::Mention { .. } => "Mention",
            Node::Directive(_) => "Directive",
            Node::Highlight(_) => "Highlight",
        }
    }

    /// Concatenated textual content of this subtree.
    ///
    /// Soft breaks contribute a newline, hard breaks nothing. Images contribute their alt
    /// text and mentions their `@name` source form.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Node::Text(value) | Node::InlineCode(value) | Node::Html(value) => out.push_str(value),
            Node::Code { value, .. } => out.push_str(value),
            Node::Image { alt, .. } => out.push_str(alt),
            Node::SoftBreak => out.push('\n'),
            Node::Mention { name, .. } => {
                out.push('@');
                out.push_str(name);
            }
            _ => {
                for child in self.children() {
                    child.push_plain_text(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_flattens_inline_markup() {
        let node = Node::Heading {
            level: 1,
            children: vec![
                Node::text("Hello "),
                Node::Strong(vec![Node::text("big")]),
                Node::text(" "),
                Node::InlineCode("world".into()),
            ],
        };
        assert_eq!(node.to_plain_text(), "Hello big world");
    }

    #[test]
    fn leaves_have_no_children() {
        assert!(Node::ThematicBreak.children().is_empty());
        assert!(Node::text("x").children_mut().is_none());
    }

    #[test]
    fn serializes_with_adjacent_tags() {
        let json = serde_json::to_value(Node::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "value": "hi"}));

        let json = serde_json::to_value(Node::ThematicBreak).unwrap();
        assert_eq!(json, serde_json::json!({"type": "thematicBreak"}));
    }

    #[test]
    fn directive_attribute_lookup() {
        let mut directive = Directive::new(DirectiveKind::Text, "high", vec![]);
        directive.attributes.push(("id".into(), "a".into()));
        directive.attributes.push(("class".into(), "x".into()));
        assert_eq!(directive.attribute("class"), Some("x"));
        assert_eq!(directive.attribute("missing"), None);
    }
}
