//! HTML serialization (render tree → HTML)
//!
//! Pipeline: RenderTree → RcDom → HTML string (→ standalone page with embedded CSS)

use crate::error::FormatError;
use crate::highlight::{HighlightedLine, StyledSpan};
use crate::marks::MarkedSegment;
use crate::render::{CodeBlock, Element, Heading, Image, Link, RenderNode, RenderTree};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Serialize the tree to an HTML fragment (the `div.text` element)
pub fn serialize_fragment(tree: &RenderTree) -> Result<String, FormatError> {
    let holder = create_element("div", vec![]);
    append_node(&holder, &tree.root);
    serialize_children(&holder)
}

/// Serialize the tree as a complete HTML page
pub fn serialize_page(tree: &RenderTree, css: &str) -> Result<String, FormatError> {
    let body = serialize_fragment(tree)?;
    let title = tree
        .headings()
        .first()
        .map(|heading| RenderNode::Heading((*heading).clone()).text_content())
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| "Markview Document".to_string());
    let escaped_title = html_escape(title.trim());

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="generator" content="markview">
  <title>{escaped_title}</title>
  <style>
{css}
  </style>
</head>
<body>
{body}
</body>
</html>"#
    ))
}

fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

fn append_all(parent: &Handle, children: &[RenderNode]) {
    for child in children {
        append_node(parent, child);
    }
}

fn append_node(parent: &Handle, node: &RenderNode) {
    match node {
        RenderNode::Element(element) => append(parent, element_handle(element)),
        RenderNode::Text(text) => append(parent, create_text(text)),
        RenderNode::Heading(heading) => append(parent, heading_handle(heading)),
        RenderNode::CodeBlock(code) => append(parent, code_block_handle(code)),
        RenderNode::InlineCode(code) => {
            let element = create_element("code", vec![]);
            append_segments(&element, &code.segments);
            append(parent, element);
        }
        RenderNode::Link(link) => append(parent, link_handle(link)),
        RenderNode::Image(image) => append(parent, image_handle(image)),
        RenderNode::Fragment(children) => append_all(parent, children),
    }
}

fn element_handle(element: &Element) -> Handle {
    let class = element.classes.join(" ");
    let mut attrs: Vec<(&str, &str)> = Vec::new();
    if !class.is_empty() {
        attrs.push(("class", class.as_str()));
    }
    attrs.extend(
        element
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );
    let handle = create_element(element.tag.as_str(), attrs);
    if !element.tag.is_void() {
        append_all(&handle, &element.children);
    }
    handle
}

fn heading_handle(heading: &Heading) -> Handle {
    let wrapper = create_element("div", vec![("class", "heading")]);
    let tag = format!("h{}", heading.level);
    let mut attrs = Vec::new();
    if let Some(id) = &heading.id {
        attrs.push(("id", id.as_str()));
    }
    let h = create_element(&tag, attrs);
    append_all(&h, &heading.children);
    append(&wrapper, h);

    if let Some(anchor) = &heading.anchor {
        let class = if anchor.copied {
            "heading-link copied"
        } else {
            "heading-link"
        };
        let a = create_element(
            "a",
            vec![
                ("class", class),
                ("href", anchor.href.as_str()),
                ("aria-label", "Copy link to this section"),
            ],
        );
        append(&a, create_text(if anchor.copied { "✓" } else { "#" }));
        append(&wrapper, a);
    }
    wrapper
}

fn code_block_handle(code: &CodeBlock) -> Handle {
    let mut attrs = vec![("class", "code-block")];
    if let Some(language) = &code.language {
        attrs.push(("data-language", language.as_str()));
    }
    let wrapper = create_element("div", attrs);
    let pre = create_element("pre", vec![]);
    let inner = create_element("code", vec![]);
    for (index, line) in code.lines.iter().enumerate() {
        if index > 0 {
            append(&inner, create_text("\n"));
        }
        append(&inner, line_handle(line, code.line_numbers));
    }
    append(&pre, inner);
    append(&wrapper, pre);
    wrapper
}

fn line_handle(line: &HighlightedLine, line_numbers: bool) -> Handle {
    let handle = create_element("span", vec![("class", "line")]);
    if line_numbers {
        let number = create_element("span", vec![("class", "line-number")]);
        append(&number, create_text(&line.number.to_string()));
        append(&handle, number);
    }
    for span in &line.spans {
        append(&handle, span_handle(span));
    }
    handle
}

fn span_handle(span: &StyledSpan) -> Handle {
    let mut style = Vec::new();
    if let Some(color) = &span.color {
        style.push(format!("color: {color}"));
    }
    if span.bold {
        style.push("font-weight: bold".to_string());
    }
    if span.italic {
        style.push("font-style: italic".to_string());
    }
    let style = style.join("; ");
    let attrs = if style.is_empty() {
        vec![]
    } else {
        vec![("style", style.as_str())]
    };
    let handle = create_element("span", attrs);
    let text = create_text(&span.text);
    if span.marked {
        let mark = create_element("mark", vec![]);
        append(&mark, text);
        append(&handle, mark);
    } else {
        append(&handle, text);
    }
    handle
}

fn append_segments(parent: &Handle, segments: &[MarkedSegment]) {
    for segment in segments {
        let text = create_text(&segment.text);
        if segment.marked {
            let mark = create_element("mark", vec![]);
            append(&mark, text);
            append(parent, mark);
        } else {
            append(parent, text);
        }
    }
}

fn link_handle(link: &Link) -> Handle {
    let mut attrs = vec![("href", link.href.as_str())];
    if link.external {
        attrs.push(("target", "_blank"));
    }
    if let Some(rel) = link.rel {
        attrs.push(("rel", rel.as_str()));
    }
    if let Some(title) = &link.title {
        attrs.push(("title", title.as_str()));
    }
    let a = create_element("a", attrs);
    append_all(&a, &link.children);
    a
}

fn image_handle(image: &Image) -> Handle {
    let style = image.style.to_css();
    let index = image.index.to_string();
    let mut attrs = vec![
        ("src", image.src.as_str()),
        ("alt", image.alt.as_str()),
        ("style", style.as_str()),
        ("data-image-index", index.as_str()),
        ("data-zoom", zoom_name(image)),
    ];
    if image.top_level {
        attrs.push(("class", "top-level"));
    }
    if let Some(title) = &image.title {
        attrs.push(("title", title.as_str()));
    }
    create_element("img", attrs)
}

fn zoom_name(image: &Image) -> &'static str {
    match image.zoom {
        crate::render::zoom::ZoomState::Fitted => "fitted",
        crate::render::zoom::ZoomState::Expanded => "expanded",
    }
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize every child of `holder`, each including its own tag
fn serialize_children(holder: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in holder.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {e}"))
        })?;
    }

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::highlight::PlainHighlighter;
    use crate::render::{render, render_with, RenderOptions};

    fn fragment(text: &str, options: &RenderOptions) -> String {
        let tree = render_with(text, options, &Classification::default(), &PlainHighlighter);
        serialize_fragment(&tree).unwrap()
    }

    #[test]
    fn test_heading_with_anchor() {
        let html = fragment("# Title", &RenderOptions::default());
        assert_eq!(
            html,
            "<div class=\"text\"><div class=\"heading\"><h1 id=\"title\">Title</h1>\
             <a class=\"heading-link\" href=\"#title\" aria-label=\"Copy link to this section\">#</a>\
             </div></div>"
        );
    }

    #[test]
    fn test_external_link_attributes() {
        let html = fragment("[a](https://x.test/)", &RenderOptions::default());
        assert!(html.contains(
            "<a href=\"https://x.test/\" target=\"_blank\" rel=\"noreferrer\">a</a>"
        ));
    }

    #[test]
    fn test_unsafe_urls_never_reach_attributes() {
        let html = fragment(
            "[click](javascript:alert(1)) ![x](javascript:alert(2)) [v](vbscript:x) \
             ![d](data:image/png;base64,AA)",
            &RenderOptions::default(),
        );
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("vbscript:"));
        assert!(!html.contains("data:"));
        assert!(html.contains(
            "<a href=\"#\" target=\"_blank\" rel=\"noreferrer\">click</a>"
        ));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = fragment("<script>x</script>", &RenderOptions::default());
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_code_block_lines() {
        let html = fragment("```\na\n:high[b]\n```", &RenderOptions::default());
        assert!(html.contains("<span class=\"line-number\">1</span>"));
        assert!(html.contains("<span><mark>b</mark></span>"));
    }

    #[test]
    fn test_image_style() {
        let html = fragment("![x](/x.png)", &RenderOptions::default());
        assert!(html.contains("style=\"max-height: 75vh; cursor: zoom-in\""));
        assert!(html.contains("class=\"top-level\""));
    }

    #[test]
    fn test_page_wraps_fragment() {
        let tree = render("# Hello <World>\n\ntext", &RenderOptions::default());
        let page = serialize_page(&tree, "body { margin: 0 }").unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Hello &lt;World&gt;</title>"));
        assert!(page.contains("body { margin: 0 }"));
    }
}
