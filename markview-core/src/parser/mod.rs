//! Markdown parsing
//!
//! Pipeline: Markdown string → Comrak AST → [`Node`] tree → text merge → syntax extensions.
//!
//! Comrak provides CommonMark plus GFM tables and autolinks. Its own strikethrough extension
//! stays off: single tildes mean subscript here, so both tilde forms are handled by
//! [`crate::extensions::tilde`]. Parsing is total; there is no error path.

use crate::ast::{Alignment, Node};
use crate::extensions::{normalize_text, ExtensionSet};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};

/// Parses markdown with a fixed set of syntax extensions
pub struct Parser {
    extensions: ExtensionSet,
}

impl Parser {
    pub fn new(extensions: ExtensionSet) -> Self {
        Parser { extensions }
    }

    pub fn parse(&self, source: &str) -> Node {
        let arena = Arena::new();
        let options = default_comrak_options();
        let root = parse_document(&arena, source, &options);

        let mut converted = Vec::new();
        convert_node(root, &mut converted);
        let mut document = match converted.pop() {
            Some(node @ Node::Root(_)) => node,
            Some(other) => Node::Root(vec![other]),
            None => Node::Root(Vec::new()),
        };

        normalize_text(&mut document);
        self.extensions.apply(&mut document);
        tracing::trace!(bytes = source.len(), "parsed document");
        document
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new(ExtensionSet::standard())
    }
}

/// Parse `source` with the standard extension set
pub fn parse(source: &str) -> Node {
    Parser::default().parse(source)
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.strikethrough = false;
    options
}

fn convert_children<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    let mut children = Vec::new();
    for child in node.children() {
        convert_node(child, &mut children);
    }
    children
}

/// Convert one Comrak node, appending the result to `out`.
///
/// Node kinds this tree has no variant for contribute their children in place.
fn convert_node<'a>(node: &'a AstNode<'a>, out: &mut Vec<Node>) {
    let node_data = node.data.borrow();

    let converted = match &node_data.value {
        NodeValue::Document => Node::Root(convert_children(node)),
        NodeValue::BlockQuote => Node::BlockQuote(convert_children(node)),
        NodeValue::List(list) => {
            let ordered = matches!(list.list_type, ListType::Ordered);
            Node::List {
                ordered,
                start: if ordered { list.start } else { 1 },
                children: convert_children(node),
            }
        }
        NodeValue::Item(_) => Node::ListItem(convert_children(node)),
        NodeValue::CodeBlock(code_block) => {
            let info = code_block.info.trim();
            Node::Code {
                lang: if info.is_empty() {
                    None
                } else {
                    Some(info.to_string())
                },
                value: code_block.literal.clone(),
            }
        }
        NodeValue::HtmlBlock(html) => Node::Html(html.literal.clone()),
        NodeValue::Paragraph => Node::Paragraph(convert_children(node)),
        NodeValue::Heading(heading) => Node::Heading {
            level: heading.level,
            children: convert_children(node),
        },
        NodeValue::ThematicBreak => Node::ThematicBreak,
        NodeValue::Table(table) => Node::Table {
            alignments: table
                .alignments
                .iter()
                .map(|alignment| match alignment {
                    TableAlignment::Left => Alignment::Left,
                    TableAlignment::Right => Alignment::Right,
                    TableAlignment::Center => Alignment::Center,
                    TableAlignment::None => Alignment::None,
                })
                .collect(),
            rows: convert_children(node),
        },
        NodeValue::TableRow(header) => Node::TableRow {
            header: *header,
            cells: convert_children(node),
        },
        NodeValue::TableCell => Node::TableCell(convert_children(node)),
        NodeValue::Text(text) => Node::Text(text.to_string()),
        NodeValue::SoftBreak => Node::SoftBreak,
        NodeValue::LineBreak => Node::Break,
        NodeValue::Code(code) => Node::InlineCode(code.literal.clone()),
        NodeValue::HtmlInline(html) => Node::Html(html.to_string()),
        NodeValue::Emph => Node::Emphasis(convert_children(node)),
        NodeValue::Strong => Node::Strong(convert_children(node)),
        NodeValue::Strikethrough => Node::Delete(convert_children(node)),
        NodeValue::Link(link) => Node::Link {
            url: link.url.clone(),
            title: link.title.clone(),
            children: convert_children(node),
        },
        NodeValue::Image(link) => Node::Image {
            url: link.url.clone(),
            title: link.title.clone(),
            alt: Node::Root(convert_children(node)).to_plain_text(),
        },
        _ => {
            out.extend(convert_children(node));
            return;
        }
    };
    out.push(converted);
}
