//! Generic directives
//!
//!     Three forms, all producing [`Node::Directive`]:
//!
//!     - text: `:name[label]{attrs}` anywhere in inline content. The label is required and
//!       may contain inline markup; brackets inside it must balance.
//!     - leaf: a paragraph line that is exactly `::name[label]{attrs}`.
//!     - container: a line `:::name[label]{attrs}` opens, a line of three or more colons
//!       closes. Everything between becomes the directive's children. A label, if present, is
//!       the first child as a paragraph. Unclosed containers run to the end of their parent.
//!
//!     The attribute block is optional. A malformed one is simply not consumed and stays in
//!     the text that follows the directive.

use super::{push_node, push_text, rewrite_lists, SyntaxExtension};
use crate::ast::{Directive, DirectiveKind, Node};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

static TEXT_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w:])(:)([A-Za-z][\w-]*)\[").unwrap());

static LEAF_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^::([A-Za-z][\w-]*)\[").unwrap());

static CONTAINER_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:{3,}([A-Za-z][\w-]*)").unwrap());

static CONTAINER_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:{3,}\s*$").unwrap());

/// Leaf and container directives
pub struct BlockDirectives;

impl SyntaxExtension for BlockDirectives {
    fn name(&self) -> &str {
        "block-directive"
    }

    fn apply(&self, root: &mut Node) {
        rewrite_lists(root, &rewrite_blocks, &is_block_container);
    }
}

/// Inline `:name[label]{attrs}` directives
pub struct TextDirectives;

impl SyntaxExtension for TextDirectives {
    fn name(&self) -> &str {
        "text-directive"
    }

    fn apply(&self, root: &mut Node) {
        rewrite_lists(root, &rewrite_text_directives, &|node: &Node| {
            !matches!(node, Node::Html(_) | Node::Code { .. })
        });
    }
}

fn is_block_container(node: &Node) -> bool {
    match node {
        Node::Root(_) | Node::BlockQuote(_) | Node::List { .. } | Node::ListItem(_) => true,
        Node::Directive(directive) => directive.kind == DirectiveKind::Container,
        _ => false,
    }
}

/// Parse a `{...}` attribute block at the start of `input`.
///
/// Returns the attributes and the number of bytes consumed, or `None` if the block is
/// malformed or unterminated.
pub fn parse_attributes(input: &str) -> Option<(Vec<(String, String)>, usize)> {
    let mut cursor = Cursor { src: input, pos: 0 };
    if cursor.bump()? != '{' {
        return None;
    }
    let mut attributes: Vec<(String, String)> = Vec::new();
    loop {
        cursor.take_while(char::is_whitespace);
        match cursor.bump()? {
            '}' => return Some((attributes, cursor.pos)),
            '#' => {
                let id = cursor.take_while(is_shorthand_char);
                if id.is_empty() {
                    return None;
                }
                attributes.retain(|(k, _)| k != "id");
                attributes.push(("id".to_string(), id.to_string()));
            }
            '.' => {
                let class = cursor.take_while(is_shorthand_char);
                if class.is_empty() {
                    return None;
                }
                match attributes.iter_mut().find(|(k, _)| k == "class") {
                    Some((_, existing)) => {
                        existing.push(' ');
                        existing.push_str(class);
                    }
                    None => attributes.push(("class".to_string(), class.to_string())),
                }
            }
            c if is_key_char(c) => {
                let start = cursor.pos - c.len_utf8();
                cursor.take_while(is_key_char);
                let key = input[start..cursor.pos].to_string();
                let value = if cursor.peek() == Some('=') {
                    cursor.bump();
                    cursor.value()?
                } else {
                    String::new()
                };
                attributes.push((key, value));
            }
            _ => return None,
        }
        match cursor.peek() {
            Some(c) if c.is_whitespace() || c == '}' => {}
            _ => return None,
        }
    }
}

fn is_shorthand_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | '#' | '.' | '"' | '\'' | '=')
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':')
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    /// Quoted or bare attribute value
    fn value(&mut self) -> Option<String> {
        match self.peek()? {
            quote @ ('"' | '\'') => {
                self.bump();
                let value = self.take_while(|c| c != quote);
                self.bump()?;
                Some(value.to_string())
            }
            _ => {
                let value = self.take_while(|c| {
                    !c.is_whitespace() && !matches!(c, '"' | '\'' | '=' | '<' | '>' | '`' | '}')
                });
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
        }
    }
}

struct LabelScan {
    label: Vec<Node>,
    attributes: Vec<(String, String)>,
    /// Text remaining after the label and attribute block
    rest: String,
}

/// Find the `]` closing a label that starts right after `[`.
///
/// The label may continue over the following siblings in `queue`; brackets are counted in
/// text nodes only. Nothing is taken from `queue` unless the label closes.
fn scan_label(after_bracket: &str, queue: &mut VecDeque<Node>) -> Option<LabelScan> {
    let mut depth = 1;
    if let Some(end) = find_close(after_bracket, &mut depth) {
        let mut label = Vec::new();
        push_text(&mut label, &after_bracket[..end]);
        return Some(finish_label(label, &after_bracket[end + 1..]));
    }

    let (index, end) = queue.iter().enumerate().find_map(|(index, node)| match node {
        Node::Text(text) => find_close(text, &mut depth).map(|end| (index, end)),
        _ => None,
    })?;
    let closing = match queue.get(index) {
        Some(Node::Text(text)) => text.clone(),
        _ => return None,
    };

    let mut label = Vec::new();
    push_text(&mut label, after_bracket);
    let mut spanned: Vec<Node> = queue.drain(..=index).collect();
    spanned.pop();
    for node in spanned {
        push_node(&mut label, node);
    }
    push_text(&mut label, &closing[..end]);
    Some(finish_label(label, &closing[end + 1..]))
}

fn find_close(text: &str, depth: &mut usize) -> Option<usize> {
    for (i, c) in text.char_indices() {
        match c {
            '[' => *depth += 1,
            ']' => {
                *depth -= 1;
                if *depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn finish_label(label: Vec<Node>, after: &str) -> LabelScan {
    let parsed = if after.starts_with('{') {
        parse_attributes(after)
    } else {
        None
    };
    match parsed {
        Some((attributes, used)) => LabelScan {
            label,
            attributes,
            rest: after[used..].to_string(),
        },
        None => LabelScan {
            label,
            attributes: Vec::new(),
            rest: after.to_string(),
        },
    }
}

fn rewrite_text_directives(children: Vec<Node>) -> Vec<Node> {
    let mut queue: VecDeque<Node> = children.into();
    let mut out = Vec::new();
    while let Some(node) = queue.pop_front() {
        let mut text = match node {
            Node::Text(text) => text,
            other => {
                out.push(other);
                continue;
            }
        };
        loop {
            let found = TEXT_DIRECTIVE.captures(&text).and_then(|caps| {
                Some((
                    caps.get(1)?.start(),
                    caps.get(2)?.as_str().to_string(),
                    caps.get(0)?.end(),
                ))
            });
            let Some((colon, name, label_start)) = found else {
                push_text(&mut out, &text);
                break;
            };
            match scan_label(&text[label_start..], &mut queue) {
                Some(scan) => {
                    push_text(&mut out, &text[..colon]);
                    let mut directive = Directive::new(DirectiveKind::Text, name, scan.label);
                    directive.attributes = scan.attributes;
                    out.push(Node::Directive(directive));
                    text = scan.rest;
                }
                None => {
                    push_text(&mut out, &text[..label_start]);
                    text = text[label_start..].to_string();
                }
            }
        }
    }
    out
}

fn rewrite_blocks(blocks: Vec<Node>) -> Vec<Node> {
    let mut root = Vec::new();
    let mut open: Vec<Directive> = Vec::new();
    for block in blocks {
        match block {
            Node::Paragraph(children) => split_paragraph(children, &mut root, &mut open),
            other => sink(&mut root, &mut open).push(other),
        }
    }
    while let Some(directive) = open.pop() {
        sink(&mut root, &mut open).push(Node::Directive(directive));
    }
    root
}

fn sink<'a>(root: &'a mut Vec<Node>, open: &'a mut [Directive]) -> &'a mut Vec<Node> {
    match open.last_mut() {
        Some(directive) => &mut directive.children,
        None => root,
    }
}

fn split_paragraph(children: Vec<Node>, root: &mut Vec<Node>, open: &mut Vec<Directive>) {
    let mut buffer: Vec<Vec<Node>> = Vec::new();
    for line in split_lines(children) {
        if let Some(directive) = container_open(&line) {
            flush_paragraph(&mut buffer, sink(root, open));
            open.push(directive);
            continue;
        }
        if !open.is_empty() && is_container_close(&line) {
            flush_paragraph(&mut buffer, sink(root, open));
            if let Some(directive) = open.pop() {
                sink(root, open).push(Node::Directive(directive));
            }
            continue;
        }
        if buffer.is_empty() {
            match leaf_directive(line) {
                Ok(directive) => sink(root, open).push(Node::Directive(directive)),
                Err(line) => buffer.push(line),
            }
            continue;
        }
        buffer.push(line);
    }
    flush_paragraph(&mut buffer, sink(root, open));
}

fn flush_paragraph(buffer: &mut Vec<Vec<Node>>, out: &mut Vec<Node>) {
    if buffer.is_empty() {
        return;
    }
    let mut children = Vec::new();
    for (i, line) in buffer.drain(..).enumerate() {
        if i > 0 {
            children.push(Node::SoftBreak);
        }
        children.extend(line);
    }
    out.push(Node::Paragraph(children));
}

fn split_lines(children: Vec<Node>) -> Vec<Vec<Node>> {
    let mut lines = vec![Vec::new()];
    for node in children {
        match node {
            Node::SoftBreak => lines.push(Vec::new()),
            other => {
                if let Some(line) = lines.last_mut() {
                    line.push(other);
                }
            }
        }
    }
    lines
}

fn single_text(line: &[Node]) -> Option<&str> {
    match line {
        [Node::Text(text)] => Some(text.as_str()),
        _ => None,
    }
}

fn is_container_close(line: &[Node]) -> bool {
    single_text(line).is_some_and(|text| CONTAINER_CLOSE.is_match(text))
}

fn container_open(line: &[Node]) -> Option<Directive> {
    let text = single_text(line)?;
    let caps = CONTAINER_OPEN.captures(text)?;
    let name = caps.get(1)?.as_str().to_string();
    let after_name = &text[caps.get(0)?.end()..];

    let mut directive = Directive::new(DirectiveKind::Container, name, Vec::new());
    let rest = if let Some(after_bracket) = after_name.strip_prefix('[') {
        let scan = scan_label(after_bracket, &mut VecDeque::new())?;
        if !scan.label.is_empty() {
            directive.children.push(Node::Paragraph(scan.label));
        }
        directive.attributes = scan.attributes;
        scan.rest
    } else if after_name.starts_with('{') {
        let (attributes, used) = parse_attributes(after_name)?;
        directive.attributes = attributes;
        after_name[used..].to_string()
    } else {
        after_name.to_string()
    };
    if rest.trim().is_empty() {
        Some(directive)
    } else {
        None
    }
}

fn leaf_directive(line: Vec<Node>) -> Result<Directive, Vec<Node>> {
    let found = match line.first() {
        Some(Node::Text(first)) => LEAF_DIRECTIVE.captures(first).and_then(|caps| {
            Some((caps.get(1)?.as_str().to_string(), caps.get(0)?.end()))
        }),
        _ => None,
    };
    let Some((name, label_start)) = found else {
        return Err(line);
    };

    let original = line.clone();
    let mut queue: VecDeque<Node> = line.into();
    let Some(Node::Text(first)) = queue.pop_front() else {
        return Err(original);
    };
    match scan_label(&first[label_start..], &mut queue) {
        Some(scan) if queue.is_empty() && scan.rest.trim().is_empty() => {
            let mut directive = Directive::new(DirectiveKind::Leaf, name, scan.label);
            directive.attributes = scan.attributes;
            Ok(directive)
        }
        _ => Err(original),
    }
}
