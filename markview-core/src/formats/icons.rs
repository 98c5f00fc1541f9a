//! Shared icon mapping for tree visualization
//!
//! Keys are document node types ([`crate::ast::Node::node_type`]) and render node kinds
//! ([`crate::render::RenderNode::kind`]), so both trees read alike.

/// Get the Unicode icon for a node type or render kind
pub fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        "Root" | "div" => "⧉",
        "Heading" | "heading" => "§",
        "Paragraph" | "p" => "¶",
        "BlockQuote" | "blockquote" => "❝",
        "List" | "ul" | "ol" => "☰",
        "ListItem" | "li" => "•",
        "Table" | "table" | "thead" | "tbody" => "▦",
        "TableRow" | "tr" => "▤",
        "TableCell" | "th" | "td" => "▢",
        "Code" | "codeBlock" => "𝒱",
        "InlineCode" | "inlineCode" => "ƒ",
        "Text" | "text" => "◦",
        "SoftBreak" => "↵",
        "Emphasis" | "em" => "𝐼",
        "Strong" | "strong" => "𝐁",
        "Delete" | "del" => "⌫",
        "Subscript" | "sub" => "₋",
        "Highlight" | "mark" => "✦",
        "Link" | "link" => "⊕",
        "Mention" => "@",
        "Image" | "image" => "▣",
        "Directive" => "⁝",
        "Html" => "‹›",
        "ThematicBreak" | "hr" => "⎯",
        "fragment" => "⋯",
        _ => "○",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_mappings() {
        assert_eq!(get_icon("Root"), "⧉");
        assert_eq!(get_icon("Paragraph"), get_icon("p"));
        assert_eq!(get_icon("Heading"), get_icon("heading"));
        assert_eq!(get_icon("Link"), "⊕");
        assert_eq!(get_icon("Directive"), "⁝");
    }

    #[test]
    fn test_unknown_node_type() {
        assert_eq!(get_icon("UnknownType"), "○");
    }
}
