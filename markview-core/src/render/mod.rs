//! Render tree
//!
//!     The render tree is what a document looks like once every behaviour has been decided:
//!     heading ids and anchors, wrapped tables, highlighted code, links resolved to either a
//!     safe hyperlink or an inline image, and images with their zoom state. It is rebuilt from
//!     scratch whenever the text or the image classification changes.
//!
//!     Entry points:
//!         - [`render`]: stateless. Parses, runs the transform pass, classifies URLs by extension
//!           only and maps the result with the shared syntect highlighter.
//!         - [`render_with`] / [`render_document`]: the caller supplies the classification and
//!           the highlighter (see [`view::DocumentView`] for the stateful variant).
//!
//!     Per-render state (slugger, image counter) lives in a [`context::RenderContext`] built
//!     fresh for every call, so two renders never share slugs.

pub mod anchor;
pub mod context;
mod mapper;
pub mod url;
pub mod view;
pub mod zoom;

use crate::ast::{extract_urls, Node};
use crate::classify::{Classification, ImageUrlPattern};
use crate::highlight::{CodeHighlighter, HighlightedLine, SyntectHighlighter};
use crate::marks::MarkedSegment;
use crate::parser::parse;
use crate::transforms::transform;
use context::RenderContext;
use serde::Serialize;
use zoom::{ImageStyle, ZoomState};

/// Options of one render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    /// Document-level rendering: headings keep their level, images may be taller, headings
    /// get a copy-link anchor.
    pub top_level: bool,
    /// No heading ids and no anchors
    pub no_fragments: bool,
    /// `rel="nofollow"` instead of `rel="noreferrer"` on external links
    pub nofollow: bool,
    /// Line numbers on code blocks
    pub line_numbers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            top_level: true,
            no_fragments: false,
            nofollow: false,
            line_numbers: true,
        }
    }
}

impl RenderOptions {
    pub fn link_rel(&self) -> LinkRel {
        if self.nofollow {
            LinkRel::NoFollow
        } else {
            LinkRel::NoReferrer
        }
    }
}

/// Relation attribute of external links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkRel {
    NoReferrer,
    NoFollow,
}

impl LinkRel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkRel::NoReferrer => "noreferrer",
            LinkRel::NoFollow => "nofollow",
        }
    }
}

/// Plain structural elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Div,
    P,
    Blockquote,
    Ul,
    Ol,
    Li,
    Hr,
    Table,
    Thead,
    Tbody,
    Tr,
    Th,
    Td,
    Em,
    Strong,
    Del,
    Sub,
    Mark,
    Br,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Div => "div",
            Tag::P => "p",
            Tag::Blockquote => "blockquote",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::Hr => "hr",
            Tag::Table => "table",
            Tag::Thead => "thead",
            Tag::Tbody => "tbody",
            Tag::Tr => "tr",
            Tag::Th => "th",
            Tag::Td => "td",
            Tag::Em => "em",
            Tag::Strong => "strong",
            Tag::Del => "del",
            Tag::Sub => "sub",
            Tag::Mark => "mark",
            Tag::Br => "br",
        }
    }

    /// Elements that never have children
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Hr | Tag::Br)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: Tag,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

impl Element {
    pub fn new(tag: Tag, children: Vec<RenderNode>) -> Self {
        Element {
            tag,
            classes: Vec::new(),
            attributes: Vec::new(),
            children,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Copy-link affordance next to a top-level heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    /// `#id`
    pub href: String,
    pub copied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Output level, after the nesting shift
    pub level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub line_numbers: bool,
    pub lines: Vec<HighlightedLine>,
}

impl CodeBlock {
    /// Code text without markers or styling
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(HighlightedLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineCode {
    pub segments: Vec<MarkedSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Opens in a new browsing context with [`Link::rel`]. Internal links (mentions) do not.
    pub external: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<LinkRel>,
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Position among the images of this render, in document order
    pub index: usize,
    pub top_level: bool,
    pub zoom: ZoomState,
    pub style: ImageStyle,
}

impl Image {
    pub fn set_zoom(&mut self, zoom: ZoomState) {
        self.zoom = zoom;
        self.style = ImageStyle::for_state(zoom, self.top_level);
    }
}

/// A node of the render tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum RenderNode {
    Element(Element),
    Text(String),
    Heading(Heading),
    CodeBlock(CodeBlock),
    InlineCode(InlineCode),
    Link(Link),
    Image(Image),
    /// Children spliced into the parent
    Fragment(Vec<RenderNode>),
}

impl RenderNode {
    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Element(element) => &element.children,
            RenderNode::Heading(heading) => &heading.children,
            RenderNode::Link(link) => &link.children,
            RenderNode::Fragment(children) => children,
            RenderNode::Text(_)
            | RenderNode::CodeBlock(_)
            | RenderNode::InlineCode(_)
            | RenderNode::Image(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<RenderNode>> {
        match self {
            RenderNode::Element(element) => Some(&mut element.children),
            RenderNode::Heading(heading) => Some(&mut heading.children),
            RenderNode::Link(link) => Some(&mut link.children),
            RenderNode::Fragment(children) => Some(children),
            _ => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, RenderNode::Image(_))
    }

    pub fn is_element(&self, tag: Tag) -> bool {
        matches!(self, RenderNode::Element(element) if element.tag == tag)
    }

    /// Name of the variant (element tag for elements)
    pub fn kind(&self) -> &'static str {
        match self {
            RenderNode::Element(element) => element.tag.as_str(),
            RenderNode::Text(_) => "text",
            RenderNode::Heading(_) => "heading",
            RenderNode::CodeBlock(_) => "codeBlock",
            RenderNode::InlineCode(_) => "inlineCode",
            RenderNode::Link(_) => "link",
            RenderNode::Image(_) => "image",
            RenderNode::Fragment(_) => "fragment",
        }
    }

    /// Visible text, markers and styling removed
    pub fn text_content(&self) -> String {
        match self {
            RenderNode::Text(text) => text.clone(),
            RenderNode::CodeBlock(code) => code.text(),
            RenderNode::InlineCode(code) => code.segments.iter().map(|s| s.text.as_str()).collect(),
            RenderNode::Image(image) => image.alt.clone(),
            other => other.children().iter().map(RenderNode::text_content).collect(),
        }
    }

    /// Preorder visit of this node and its descendants
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a RenderNode)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut RenderNode)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children.iter_mut() {
                child.visit_mut(f);
            }
        }
    }
}

/// Output of one render: a `div.text` wrapping the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderTree {
    pub root: RenderNode,
}

impl RenderTree {
    /// Every node matching `pred`, in document order
    pub fn find_all(&self, pred: impl Fn(&RenderNode) -> bool) -> Vec<&RenderNode> {
        let mut found = Vec::new();
        self.root.visit(&mut |node| {
            if pred(node) {
                found.push(node);
            }
        });
        found
    }

    pub fn headings(&self) -> Vec<&Heading> {
        self.find_all(|node| matches!(node, RenderNode::Heading(_)))
            .into_iter()
            .filter_map(|node| match node {
                RenderNode::Heading(heading) => Some(heading),
                _ => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<&Image> {
        self.find_all(RenderNode::is_image)
            .into_iter()
            .filter_map(|node| match node {
                RenderNode::Image(image) => Some(image),
                _ => None,
            })
            .collect()
    }

    pub fn links(&self) -> Vec<&Link> {
        self.find_all(|node| matches!(node, RenderNode::Link(_)))
            .into_iter()
            .filter_map(|node| match node {
                RenderNode::Link(link) => Some(link),
                _ => None,
            })
            .collect()
    }

    pub fn text_content(&self) -> String {
        self.root.text_content()
    }
}

/// Render markdown `text` without any external state.
///
/// Links are classified by extension only; nothing is probed.
pub fn render(text: &str, options: &RenderOptions) -> RenderTree {
    let mut document = parse(text);
    transform(&mut document);
    let classification =
        Classification::seeded(extract_urls(&document), &ImageUrlPattern::default());
    render_document(
        &document,
        options,
        &classification,
        SyntectHighlighter::shared(),
    )
}

/// Render markdown `text` against a classification owned by the caller
pub fn render_with(
    text: &str,
    options: &RenderOptions,
    classification: &Classification,
    highlighter: &dyn CodeHighlighter,
) -> RenderTree {
    let mut document = parse(text);
    transform(&mut document);
    render_document(&document, options, classification, highlighter)
}

/// Map an already parsed and transformed document
pub fn render_document(
    document: &Node,
    options: &RenderOptions,
    classification: &Classification,
    highlighter: &dyn CodeHighlighter,
) -> RenderTree {
    let mut context = RenderContext::new(*options, classification, highlighter);
    let children = mapper::map_children(&mut context, document.children());
    tracing::trace!(images = context.image_count(), "mapped render tree");
    RenderTree {
        root: RenderNode::Element(Element::new(Tag::Div, children).with_class("text")),
    }
}
