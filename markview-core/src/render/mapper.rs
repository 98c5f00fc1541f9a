//! Document node → render node mapping

use super::context::RenderContext;
use super::url::{safe_href, safe_url};
use super::zoom::{ImageStyle, ZoomState};
use super::{Anchor, CodeBlock, Element, Heading, Image, InlineCode, Link, RenderNode, Tag};
use crate::ast::{Alignment, Directive, DirectiveKind, Node};
use crate::highlight::overlay_marks;
use crate::marks::{expand_marks, mark_ranges, split_marks, strip_escaped_marks, strip_marks};
use regex::Regex;
use std::sync::LazyLock;

static LANGUAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+").unwrap());

pub(super) fn map_children(ctx: &mut RenderContext, nodes: &[Node]) -> Vec<RenderNode> {
    nodes.iter().map(|node| map_node(ctx, node)).collect()
}

fn element(ctx: &mut RenderContext, tag: Tag, children: &[Node]) -> RenderNode {
    RenderNode::Element(Element::new(tag, map_children(ctx, children)))
}

fn map_node(ctx: &mut RenderContext, node: &Node) -> RenderNode {
    match node {
        Node::Root(children) => RenderNode::Fragment(map_children(ctx, children)),
        Node::Heading { level, children } => map_heading(ctx, *level, node, children),
        Node::Paragraph(children) => element(ctx, Tag::P, children),
        Node::BlockQuote(children) => element(ctx, Tag::Blockquote, children),
        Node::List {
            ordered,
            start,
            children,
        } => {
            let list = if *ordered {
                let list = Element::new(Tag::Ol, map_children(ctx, children));
                if *start != 1 {
                    list.with_attribute("start", start.to_string())
                } else {
                    list
                }
            } else {
                Element::new(Tag::Ul, map_children(ctx, children))
            };
            RenderNode::Element(list)
        }
        Node::ListItem(children) => element(ctx, Tag::Li, children),
        Node::ThematicBreak => RenderNode::Element(Element::new(Tag::Hr, Vec::new())),
        Node::Code { lang, value } => map_code_block(ctx, lang.as_deref(), value),
        // raw HTML is shown, never interpreted
        Node::Html(raw) => RenderNode::Text(raw.clone()),
        Node::Table { alignments, rows } => map_table(ctx, alignments, rows),
        // rows and cells outside a table cannot come out of the parser
        Node::TableRow { cells, .. } => element(ctx, Tag::Tr, cells),
        Node::TableCell(children) => element(ctx, Tag::Td, children),
        Node::Text(text) => RenderNode::Text(text.clone()),
        Node::Emphasis(children) => element(ctx, Tag::Em, children),
        Node::Strong(children) => element(ctx, Tag::Strong, children),
        Node::Delete(children) => element(ctx, Tag::Del, children),
        Node::Subscript(children) => element(ctx, Tag::Sub, children),
        Node::Highlight(children) => element(ctx, Tag::Mark, children),
        Node::InlineCode(value) => RenderNode::InlineCode(InlineCode {
            segments: split_marks(value),
        }),
        Node::SoftBreak => RenderNode::Text("\n".to_string()),
        Node::Break => RenderNode::Element(Element::new(Tag::Br, Vec::new())),
        Node::Link {
            url,
            title,
            children,
        } => map_link(ctx, url, title, children),
        Node::Image { url, title, alt } => image(ctx, url, alt, title),
        Node::Mention { name, target } => RenderNode::Link(Link {
            href: safe_href(target),
            title: None,
            external: false,
            rel: None,
            children: vec![RenderNode::Text(format!("@{name}"))],
        }),
        Node::Directive(directive) => map_directive(ctx, directive),
    }
}

fn map_heading(ctx: &mut RenderContext, level: u8, node: &Node, children: &[Node]) -> RenderNode {
    let top_level = ctx.options().top_level;
    let level = if top_level {
        level.min(6)
    } else {
        (level + 2).min(6)
    };
    let id = ctx.heading_id(&node.to_plain_text());
    let anchor = match &id {
        Some(id) if top_level => Some(Anchor {
            href: format!("#{id}"),
            copied: false,
        }),
        _ => None,
    };
    RenderNode::Heading(Heading {
        level,
        id,
        anchor,
        children: map_children(ctx, children),
    })
}

fn map_table(ctx: &mut RenderContext, alignments: &[Alignment], rows: &[Node]) -> RenderNode {
    let mut head = Vec::new();
    let mut body = Vec::new();
    for row in rows {
        let Node::TableRow { header, cells } = row else {
            body.push(map_node(ctx, row));
            continue;
        };
        let cell_tag = if *header { Tag::Th } else { Tag::Td };
        let cells = cells
            .iter()
            .enumerate()
            .map(|(column, cell)| {
                let mut element = Element::new(cell_tag, map_children(ctx, cell.children()));
                if let Some(align) = alignments.get(column).and_then(alignment_css) {
                    element = element.with_attribute("style", format!("text-align: {align}"));
                }
                RenderNode::Element(element)
            })
            .collect();
        let tr = RenderNode::Element(Element::new(Tag::Tr, cells));
        if *header {
            head.push(tr);
        } else {
            body.push(tr);
        }
    }

    let mut sections = Vec::new();
    if !head.is_empty() {
        sections.push(RenderNode::Element(Element::new(Tag::Thead, head)));
    }
    if !body.is_empty() {
        sections.push(RenderNode::Element(Element::new(Tag::Tbody, body)));
    }
    let table = Element::new(Tag::Table, sections)
        .with_class("table")
        .with_class("table-bordered")
        .with_class("table-sm");
    RenderNode::Element(
        Element::new(Tag::Div, vec![RenderNode::Element(table)]).with_class("table-responsive"),
    )
}

fn alignment_css(alignment: &Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

fn map_code_block(ctx: &mut RenderContext, info: Option<&str>, value: &str) -> RenderNode {
    let language = info
        .and_then(|info| LANGUAGE.find(info))
        .map(|m| m.as_str().to_string());
    let code = value.strip_suffix('\n').unwrap_or(value);
    let (text, ranges) = mark_ranges(code);
    let lines = ctx.highlighter().highlight(&text, language.as_deref());
    RenderNode::CodeBlock(CodeBlock {
        language,
        line_numbers: ctx.options().line_numbers,
        lines: overlay_marks(lines, &ranges),
    })
}

fn map_link(ctx: &mut RenderContext, url: &str, title: &str, children: &[Node]) -> RenderNode {
    let mapped = map_children(ctx, children);
    if mapped.iter().any(RenderNode::is_image) {
        return RenderNode::Fragment(mapped);
    }

    if safe_url(url).is_some() && ctx.classification().is_loaded(url) {
        let alt = strip_marks(&Node::Root(children.to_vec()).to_plain_text());
        return image(ctx, url, &alt, title);
    }

    RenderNode::Link(Link {
        href: safe_href(&strip_marks(&strip_escaped_marks(url))),
        title: non_empty(title),
        external: true,
        rel: Some(ctx.options().link_rel()),
        children: mapped.into_iter().flat_map(expand_text_marks).collect(),
    })
}

/// Raw `:high[..]` markers left in link label text become marks
fn expand_text_marks(node: RenderNode) -> Vec<RenderNode> {
    let text = match node {
        RenderNode::Text(text) => text,
        other => return vec![other],
    };
    expand_marks(&text)
        .into_iter()
        .map(|piece| match piece {
            Node::Highlight(children) => RenderNode::Element(Element::new(
                Tag::Mark,
                vec![RenderNode::Text(Node::Root(children).to_plain_text())],
            )),
            other => RenderNode::Text(other.to_plain_text()),
        })
        .collect()
}

fn image(ctx: &mut RenderContext, url: &str, alt: &str, title: &str) -> RenderNode {
    let src = match safe_url(url) {
        Some(src) if !src.is_empty() => src,
        _ => return RenderNode::Fragment(Vec::new()),
    };
    let top_level = ctx.options().top_level;
    RenderNode::Image(Image {
        src: src.to_string(),
        alt: alt.to_string(),
        title: non_empty(title),
        index: ctx.next_image(),
        top_level,
        zoom: ZoomState::Fitted,
        style: ImageStyle::for_state(ZoomState::Fitted, top_level),
    })
}

fn map_directive(ctx: &mut RenderContext, directive: &Directive) -> RenderNode {
    let children = map_children(ctx, &directive.children);
    if directive.kind == DirectiveKind::Text {
        return RenderNode::Fragment(children);
    }

    let mut block = Element::new(Tag::Div, children).with_class(directive.name.clone());
    if let Some(classes) = directive.attribute("class") {
        for class in classes.split_whitespace() {
            block = block.with_class(class);
        }
    }
    if let Some(id) = directive.attribute("id") {
        block = block.with_attribute("id", id);
    }
    RenderNode::Element(block)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
