//! Span-indexed XML document.
//!
//! The document keeps the original text verbatim and indexes every element
//! by byte span. Mutations are expressed as [`Edit`]s against the text, so
//! serialization is the buffer itself: anything not explicitly edited
//! (comments, whitespace, attribute quoting, declarations) survives
//! byte-for-byte.

use crate::edit::{Edit, EditResult};
use crate::xml::errors::XmlError;

/// Namespace URI of Maven project descriptors.
pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Decoded value (entities resolved)
    pub value: String,
}

#[derive(Debug, Clone)]
struct ElementInfo {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<usize>,
    /// Offset of `<` of the start tag
    open_start: usize,
    /// Offset just past `>` of the start tag
    open_end: usize,
    /// Offset of `</` (equals open_end for self-closing elements)
    close_start: usize,
    /// Offset just past `>` of the end tag
    close_end: usize,
    self_closing: bool,
}

/// An editable manifest: the raw text plus an element index over it.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    content: String,
    elements: Vec<ElementInfo>,
    root: usize,
}

impl ManifestDocument {
    pub fn parse(content: &str) -> Result<Self, XmlError> {
        Self::from_string(content.to_string())
    }

    pub fn from_string(content: String) -> Result<Self, XmlError> {
        let (elements, root) = scan_elements(&content)?;
        Ok(Self {
            content,
            elements,
            root,
        })
    }

    pub fn root(&self) -> Element<'_> {
        self.element(self.root)
    }

    /// Serialized form of the document.
    pub fn to_xml(&self) -> &str {
        &self.content
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.content
    }

    pub(crate) fn element(&self, index: usize) -> Element<'_> {
        Element { doc: self, index }
    }

    /// Replace the content of element `index` with `value` (escaped).
    ///
    /// Start and end tags are left as written; a self-closing element is
    /// expanded into a start/end pair around the new text.
    pub(crate) fn set_text(&mut self, index: usize, value: &str) -> Result<EditResult, XmlError> {
        let info = &self.elements[index];
        let escaped = escape_text(value);

        let edit = if info.self_closing {
            let open = &self.content[info.open_start..info.open_end];
            let head = open.strip_suffix("/>").unwrap_or(open).trim_end();
            Edit::new(
                info.open_start,
                info.open_end,
                format!("{head}>{escaped}</{}>", info.name),
                open,
            )
        } else {
            let current = &self.content[info.open_end..info.close_start];
            Edit::new(info.open_end, info.close_start, escaped, current)
        };

        let result = edit.apply_to(&mut self.content)?;
        if result.is_applied() {
            self.rescan()?;
        }
        Ok(result)
    }

    fn rescan(&mut self) -> Result<(), XmlError> {
        let (elements, root) = scan_elements(&self.content)?;
        self.elements = elements;
        self.root = root;
        Ok(())
    }
}

/// Borrowed view of one element.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    doc: &'a ManifestDocument,
    index: usize,
}

impl<'a> Element<'a> {
    fn info(&self) -> &'a ElementInfo {
        &self.doc.elements[self.index]
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Qualified name as written, including any prefix.
    pub fn name(&self) -> &'a str {
        &self.info().name
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &'a str {
        let name = self.name();
        name.rsplit_once(':').map_or(name, |(_, local)| local)
    }

    /// Names containing `:` must match exactly. A bare name matches an
    /// unprefixed element, or a prefixed one whose prefix the root binds to
    /// [`POM_NAMESPACE`].
    pub fn is_named(&self, name: &str) -> bool {
        if name.contains(':') {
            return self.name() == name;
        }
        match self.name().split_once(':') {
            None => self.name() == name,
            Some((prefix, local)) => {
                local == name
                    && self
                        .doc
                        .root()
                        .attribute(&format!("xmlns:{prefix}"))
                        .is_some_and(|uri| uri == POM_NAMESPACE)
            }
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.info()
            .attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        &self.info().attributes
    }

    pub fn is_self_closing(&self) -> bool {
        self.info().self_closing
    }

    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let doc = self.doc;
        self.info()
            .children
            .iter()
            .map(move |&index| Element { doc, index })
    }

    /// First child with the given name, in document order.
    pub fn child(&self, name: &str) -> Option<Element<'a>> {
        self.children().find(|child| child.is_named(name))
    }

    /// Decoded direct text content: entities resolved, CDATA unwrapped,
    /// comments and child elements skipped.
    pub fn text(&self) -> String {
        let info = self.info();
        let content = &self.doc.content;
        let mut text = String::new();
        let mut cursor = info.open_end;

        for child in &info.children {
            let child = &self.doc.elements[*child];
            text.push_str(&decode_segment(&content[cursor..child.open_start]));
            cursor = child.close_end;
        }
        text.push_str(&decode_segment(&content[cursor..info.close_start]));
        text
    }

    /// Raw bytes of the whole element, tags included.
    pub fn outer_xml(&self) -> &'a str {
        let info = self.info();
        &self.doc.content[info.open_start..info.close_end]
    }
}

/// Escape character data for element content.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Resolve predefined and numeric character references. Unknown references
/// are kept literally.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}

fn decode_segment(raw: &str) -> String {
    let mut out = String::new();
    let mut rest = raw;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |idx| &after[idx + 3..]);
            continue;
        }
        if let Some(after) = rest.strip_prefix("<![CDATA[") {
            match after.find("]]>") {
                Some(idx) => {
                    out.push_str(&after[..idx]);
                    rest = &after[idx + 3..];
                }
                None => {
                    out.push_str(after);
                    rest = "";
                }
            }
            continue;
        }
        if let Some(after) = rest.strip_prefix("<?") {
            rest = after.find("?>").map_or("", |idx| &after[idx + 2..]);
            continue;
        }

        // A stray '<' is taken literally so the loop always advances.
        let next = if rest.starts_with('<') {
            rest[1..].find('<').map_or(rest.len(), |idx| idx + 1)
        } else {
            rest.find('<').unwrap_or(rest.len())
        };
        out.push_str(&unescape(&rest[..next]));
        rest = &rest[next..];
    }

    out
}

struct StartTag {
    name: String,
    attributes: Vec<Attribute>,
    end: usize,
    self_closing: bool,
}

fn scan_elements(content: &str) -> Result<(Vec<ElementInfo>, usize), XmlError> {
    let bytes = content.as_bytes();
    let mut elements: Vec<ElementInfo> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut root: Option<usize> = None;
    let mut pos = if content.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            let next = find_from(content, pos, "<").unwrap_or(bytes.len());
            if stack.is_empty() && !content[pos..next].trim().is_empty() {
                return Err(XmlError::malformed_at(
                    content,
                    pos,
                    "text outside of the root element",
                ));
            }
            pos = next;
            continue;
        }

        let rest = &content[pos..];
        if rest.starts_with("<!--") {
            pos = skip_past(content, pos, 4, "-->", "comment")?;
        } else if rest.starts_with("<![CDATA[") {
            if stack.is_empty() {
                return Err(XmlError::malformed_at(
                    content,
                    pos,
                    "CDATA section outside of the root element",
                ));
            }
            pos = skip_past(content, pos, 9, "]]>", "CDATA section")?;
        } else if rest.starts_with("<?") {
            pos = skip_past(content, pos, 2, "?>", "processing instruction")?;
        } else if rest.starts_with("<!") {
            if !stack.is_empty() || root.is_some() {
                return Err(XmlError::malformed_at(
                    content,
                    pos,
                    "markup declaration is only allowed before the root element",
                ));
            }
            pos = skip_declaration(content, pos)?;
        } else if rest.starts_with("</") {
            let (name, name_end) = read_name(content, pos + 2)?;
            let gt = skip_whitespace(content, name_end);
            if bytes.get(gt) != Some(&b'>') {
                return Err(XmlError::malformed_at(
                    content,
                    gt,
                    format!("expected '>' to close end tag </{name}"),
                ));
            }
            let Some(open) = stack.pop() else {
                return Err(XmlError::malformed_at(
                    content,
                    pos,
                    format!("unexpected closing tag </{name}>"),
                ));
            };
            if elements[open].name != name {
                return Err(XmlError::malformed_at(
                    content,
                    pos,
                    format!(
                        "mismatched closing tag </{name}>, expected </{}>",
                        elements[open].name
                    ),
                ));
            }
            elements[open].close_start = pos;
            elements[open].close_end = gt + 1;
            pos = gt + 1;
        } else {
            if root.is_some() && stack.is_empty() {
                return Err(XmlError::malformed_at(
                    content,
                    pos,
                    "document has more than one root element",
                ));
            }
            let tag = scan_start_tag(content, pos)?;
            let index = elements.len();
            match stack.last() {
                Some(&parent) => elements[parent].children.push(index),
                None => root = Some(index),
            }
            elements.push(ElementInfo {
                name: tag.name,
                attributes: tag.attributes,
                children: Vec::new(),
                open_start: pos,
                open_end: tag.end,
                close_start: tag.end,
                close_end: tag.end,
                self_closing: tag.self_closing,
            });
            if !tag.self_closing {
                stack.push(index);
            }
            pos = tag.end;
        }
    }

    if let Some(&open) = stack.last() {
        return Err(XmlError::malformed_at(
            content,
            elements[open].open_start,
            format!("element <{}> is never closed", elements[open].name),
        ));
    }

    let root = root.ok_or_else(|| {
        XmlError::malformed_at(content, content.len(), "document has no root element")
    })?;
    Ok((elements, root))
}

fn scan_start_tag(content: &str, start: usize) -> Result<StartTag, XmlError> {
    let bytes = content.as_bytes();
    let (name, mut pos) = read_name(content, start + 1)?;
    let mut attributes = Vec::new();

    loop {
        let after_ws = skip_whitespace(content, pos);
        match bytes.get(after_ws) {
            None => {
                return Err(XmlError::malformed_at(
                    content,
                    start,
                    format!("unterminated start tag <{name}"),
                ));
            }
            Some(b'>') => {
                return Ok(StartTag {
                    name,
                    attributes,
                    end: after_ws + 1,
                    self_closing: false,
                });
            }
            Some(b'/') => {
                if bytes.get(after_ws + 1) == Some(&b'>') {
                    return Ok(StartTag {
                        name,
                        attributes,
                        end: after_ws + 2,
                        self_closing: true,
                    });
                }
                return Err(XmlError::malformed_at(
                    content,
                    after_ws,
                    "expected '>' after '/' in start tag",
                ));
            }
            Some(_) => {
                if after_ws == pos {
                    return Err(XmlError::malformed_at(
                        content,
                        pos,
                        "expected whitespace before attribute",
                    ));
                }
                let (attr_name, name_end) = read_name(content, after_ws)?;
                let eq = skip_whitespace(content, name_end);
                if bytes.get(eq) != Some(&b'=') {
                    return Err(XmlError::malformed_at(
                        content,
                        eq,
                        format!("attribute '{attr_name}' has no value"),
                    ));
                }
                let quote_pos = skip_whitespace(content, eq + 1);
                let quote = match bytes.get(quote_pos) {
                    Some(&q) if q == b'"' || q == b'\'' => q as char,
                    _ => {
                        return Err(XmlError::malformed_at(
                            content,
                            quote_pos,
                            format!("value of attribute '{attr_name}' must be quoted"),
                        ));
                    }
                };
                let value_start = quote_pos + 1;
                let value_end = content[value_start..]
                    .find(quote)
                    .map(|idx| value_start + idx)
                    .ok_or_else(|| {
                        XmlError::malformed_at(
                            content,
                            quote_pos,
                            format!("unterminated value of attribute '{attr_name}'"),
                        )
                    })?;
                let raw = &content[value_start..value_end];
                if raw.contains('<') {
                    return Err(XmlError::malformed_at(
                        content,
                        value_start,
                        "'<' is not allowed in attribute values",
                    ));
                }
                attributes.push(Attribute {
                    name: attr_name,
                    value: unescape(raw),
                });
                pos = value_end + 1;
            }
        }
    }
}

fn is_name_byte(b: u8) -> bool {
    !(b.is_ascii_whitespace()
        || matches!(b, b'/' | b'>' | b'<' | b'=' | b'"' | b'\'' | b'!' | b'?'))
}

fn read_name(content: &str, start: usize) -> Result<(String, usize), XmlError> {
    let bytes = content.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_name_byte(bytes[end]) {
        end += 1;
    }

    let name = &content[start..end];
    match name.chars().next() {
        None => Err(XmlError::malformed_at(content, start, "expected a name")),
        Some(first) if first.is_ascii_digit() || first == '-' || first == '.' => Err(
            XmlError::malformed_at(content, start, format!("invalid name '{name}'")),
        ),
        Some(_) => Ok((name.to_string(), end)),
    }
}

fn skip_whitespace(content: &str, mut pos: usize) -> usize {
    let bytes = content.as_bytes();
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn find_from(content: &str, pos: usize, pattern: &str) -> Option<usize> {
    content[pos..].find(pattern).map(|idx| pos + idx)
}

fn skip_past(
    content: &str,
    start: usize,
    open_len: usize,
    terminator: &str,
    what: &str,
) -> Result<usize, XmlError> {
    find_from(content, start + open_len, terminator)
        .map(|idx| idx + terminator.len())
        .ok_or_else(|| XmlError::malformed_at(content, start, format!("unterminated {what}")))
}

/// Skip a `<!DOCTYPE ...>` style declaration, including an internal subset.
fn skip_declaration(content: &str, start: usize) -> Result<usize, XmlError> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut pos = start + 2;

    while pos < bytes.len() {
        let b = bytes[pos];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(pos + 1),
                _ => {}
            },
        }
        pos += 1;
    }

    Err(XmlError::malformed_at(
        content,
        start,
        "unterminated markup declaration",
    ))
}
