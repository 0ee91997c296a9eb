/* 📖 # How are top-level keys rewritten in place?

The old text is scanned once to find the root object and the byte ranges of its properties.
Every change is then expressed as an independent edit against that original text:

- a key that was in the old value but not in the new one is deleted along with what it owns:
  its comma, the comment lines directly above it and the comments after it on its line
- a key whose value changed gets its value range replaced
- a key that is new is appended after the last surviving property and its line comment

Commas are fixed up afterwards so the document keeps its trailing comma style.

All edits refer to disjoint ranges of the original text, so they are applied in one pass in
offset order and the result does not depend on map iteration order. Everything outside the
edited ranges, comments included, is copied through unchanged.
*/

use serde::Serialize;
use serde_json::{Map, Value};

use livefile_base::LivefileResult;

use super::scanner::{Token, TokenKind};
use crate::format::{serialize_error, syntax_error};

const DEFAULT_INDENT: &str = "  ";

/// Replace `length` bytes at `offset` of the original text with `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edit {
    pub offset: usize,
    pub length: usize,
    pub content: String,
}

impl Edit {
    fn replace(start: usize, end: usize, content: String) -> Self {
        Self {
            offset: start,
            length: end - start,
            content,
        }
    }

    fn delete(start: usize, end: usize) -> Self {
        Self::replace(start, end, String::new())
    }

    fn insert(offset: usize, content: String) -> Self {
        Self::replace(offset, offset, content)
    }
}

/// A property of the root object, as byte positions into the original text.
#[derive(Debug, Clone)]
struct Property {
    key: String,
    /// Start of the comment lines directly above the key, or the key itself
    lead_start: usize,
    start: usize,
    value_start: usize,
    value_end: usize,
    comma: Option<(usize, usize)>,
    /// End of the comma and any comments that follow it on the same line
    trailing_end: usize,
}

#[derive(Debug)]
struct RootObject {
    /// Position just after the opening brace
    inner_start: usize,
    properties: Vec<Property>,
}

fn is_blank(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Start of the first comment between `region_start` and `key_start` that sits on a line of
/// its own. Comments on the same line as `region_start` belong to the previous property.
fn leading_comment_start(text: &str, tokens: &[Token], region_start: usize, key_start: usize) -> usize {
    let Some(newline) = text[region_start..key_start].find('\n') else {
        return key_start;
    };
    let first_line_break = region_start + newline;
    tokens
        .iter()
        .find(|t| t.kind.is_comment() && t.start > first_line_break && t.start < key_start)
        .map_or(key_start, |t| t.start)
}

/// Extend `from` over comments that start on the same line. A block comment that starts
/// there is taken whole, even when it continues on later lines.
fn same_line_trailing_end(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut end = from;
    let mut pos = from;
    loop {
        while pos < bytes.len() && is_blank(bytes[pos]) {
            pos += 1;
        }
        let rest = &text[pos..];
        if rest.starts_with("//") {
            let line_end = rest.find('\n').map_or(bytes.len(), |i| pos + i);
            return text[..line_end].trim_end_matches('\r').len();
        }
        if !rest.starts_with("/*") {
            return end;
        }
        let Some(close) = rest.find("*/") else {
            return end;
        };
        pos += close + 2;
        end = pos;
        if rest[..close].contains('\n') {
            return end;
        }
    }
}

/// Locate the root object and its properties. Returns `None` when the root is not an object.
fn scan_root_object(text: &str, tokens: &[Token]) -> LivefileResult<Option<RootObject>> {
    let significant: Vec<Token> = tokens
        .iter()
        .filter(|t| !t.kind.is_comment())
        .copied()
        .collect();
    let Some(open) = significant.first() else {
        return Ok(None);
    };
    if open.kind != TokenKind::OpenBrace {
        return Ok(None);
    }

    let unexpected = |token: Option<&Token>| match token {
        Some(token) => syntax_error(
            "JSONC",
            format!("unexpected token at byte {}", token.start),
        ),
        None => syntax_error("JSONC", "unexpected end of input"),
    };

    let mut properties = Vec::new();
    let mut region_start = open.end;
    let mut index = 1;
    loop {
        let token = significant.get(index);
        match token.map(|t| t.kind) {
            Some(TokenKind::CloseBrace) => break,
            Some(TokenKind::String) => {}
            _ => return Err(unexpected(token)),
        }
        let key_token = significant[index];
        let key: String = serde_json::from_str(&text[key_token.start..key_token.end])
            .map_err(|e| syntax_error("JSONC", e))?;

        index += 1;
        if significant.get(index).map(|t| t.kind) != Some(TokenKind::Colon) {
            return Err(unexpected(significant.get(index)));
        }

        index += 1;
        let value_start_token = significant
            .get(index)
            .copied()
            .ok_or_else(|| unexpected(None))?;
        index = skip_value(&significant, index).ok_or_else(|| unexpected(None))?;
        let value_end = significant[index - 1].end;

        let comma = match significant.get(index).map(|t| t.kind) {
            Some(TokenKind::Comma) => {
                let comma_token = significant[index];
                index += 1;
                Some((comma_token.start, comma_token.end))
            }
            Some(TokenKind::CloseBrace) => None,
            _ => return Err(unexpected(significant.get(index))),
        };
        let separator_end = comma.map_or(value_end, |(_, end)| end);
        properties.push(Property {
            key,
            lead_start: leading_comment_start(text, tokens, region_start, key_token.start),
            start: key_token.start,
            value_start: value_start_token.start,
            value_end,
            comma,
            trailing_end: same_line_trailing_end(text, separator_end),
        });
        region_start = separator_end;
        if comma.is_none() {
            break;
        }
    }

    Ok(Some(RootObject {
        inner_start: open.end,
        properties,
    }))
}

/// Byte range removed when a property is deleted.
///
/// A property that occupies whole lines takes those lines with it, including its leading
/// comment lines. A property sharing its line with others takes the blanks on one side.
fn deletion_span(text: &str, property: &Property) -> (usize, usize) {
    let bytes = text.as_bytes();
    let line_start = text[..property.lead_start].rfind('\n').map_or(0, |i| i + 1);
    let owns_line_start = bytes[line_start..property.lead_start]
        .iter()
        .all(|b| is_blank(*b));

    let mut end = property.trailing_end;
    while end < bytes.len() && is_blank(bytes[end]) {
        end += 1;
    }
    let line_end = match (bytes.get(end), bytes.get(end + 1)) {
        (Some(b'\n'), _) => Some(end + 1),
        (Some(b'\r'), Some(b'\n')) => Some(end + 2),
        _ => None,
    };
    if let (true, Some(line_end)) = (owns_line_start, line_end) {
        return (line_start, line_end);
    }

    let mut start = property.lead_start;
    while start > 0 && is_blank(bytes[start - 1]) {
        start -= 1;
    }
    if start < property.lead_start {
        (start, property.trailing_end)
    } else {
        (property.lead_start, end)
    }
}

/// Merge overlapping or touching ranges into deletion edits.
fn merged_deletions(mut spans: Vec<(usize, usize)>) -> Vec<Edit> {
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
        .into_iter()
        .map(|(start, end)| Edit::delete(start, end))
        .collect()
}

/// Returns the index of the first token after the value starting at `index`.
fn skip_value(tokens: &[Token], index: usize) -> Option<usize> {
    let first = tokens.get(index)?;
    if !matches!(first.kind, TokenKind::OpenBrace | TokenKind::OpenBracket) {
        return Some(index + 1);
    }
    let mut depth = 0usize;
    for (offset, token) in tokens[index..].iter().enumerate() {
        match token.kind {
            TokenKind::OpenBrace | TokenKind::OpenBracket => depth += 1,
            TokenKind::CloseBrace | TokenKind::CloseBracket => {
                depth -= 1;
                if depth == 0 {
                    return Some(index + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Whitespace before the first property, if that property starts its own line.
fn detect_indent(text: &str, root: &RootObject) -> String {
    let Some(first) = root.properties.first() else {
        return DEFAULT_INDENT.to_string();
    };
    let line_start = text[..first.start].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &text[line_start..first.start];
    if line_start > 0 && !prefix.is_empty() && prefix.chars().all(|c| c == ' ' || c == '\t') {
        prefix.to_string()
    } else {
        DEFAULT_INDENT.to_string()
    }
}

pub(crate) fn detect_line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Pretty-print a value nested one level deep below the root object.
fn render_value(value: &Value, indent: &str, eol: &str) -> LivefileResult<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| serialize_error("JSONC", e))?;
    let rendered = String::from_utf8(buffer).map_err(|e| serialize_error("JSONC", e))?;
    let separator = format!("{}{}", eol, indent);
    Ok(rendered.split('\n').collect::<Vec<_>>().join(&separator))
}

fn render_property(key: &str, value: &Value, indent: &str, eol: &str) -> LivefileResult<String> {
    let key = serde_json::to_string(key).map_err(|e| serialize_error("JSONC", e))?;
    Ok(format!("{}: {}", key, render_value(value, indent, eol)?))
}

/// Compute the edits that turn `text` (which parsed to `old`) into a document for `new`.
///
/// Returns `None` when the root of `text` is not an object.
pub(crate) fn compute_edits(
    text: &str,
    tokens: &[Token],
    old: &Map<String, Value>,
    new: &Map<String, Value>,
) -> LivefileResult<Option<Vec<Edit>>> {
    let Some(root) = scan_root_object(text, tokens)? else {
        return Ok(None);
    };
    let indent = detect_indent(text, &root);
    let eol = detect_line_ending(text);
    let properties = &root.properties;

    let deleted: Vec<bool> = properties
        .iter()
        .map(|p| old.contains_key(&p.key) && !new.contains_key(&p.key))
        .collect();

    let spans = properties
        .iter()
        .zip(&deleted)
        .filter(|(_, deleted)| **deleted)
        .map(|(property, _)| deletion_span(text, property))
        .collect();
    let mut edits = merged_deletions(spans);

    // Replacements of changed values, on the last occurrence of each key
    for (position, property) in properties.iter().enumerate() {
        if deleted[position] {
            continue;
        }
        let is_last_occurrence = !properties[position + 1..]
            .iter()
            .any(|p| p.key == property.key);
        if !is_last_occurrence {
            continue;
        }
        let Some(new_value) = new.get(&property.key) else {
            continue;
        };
        if old.get(&property.key) == Some(new_value) {
            continue;
        }
        edits.push(Edit::replace(
            property.value_start,
            property.value_end,
            render_value(new_value, &indent, eol)?,
        ));
    }

    let mut inserted = Vec::new();
    for (key, value) in new {
        if !properties.iter().any(|p| &p.key == key) {
            inserted.push(render_property(key, value, &indent, eol)?);
        }
    }

    // Keep the document's trailing comma style
    let trailing_comma = properties.last().is_some_and(|p| p.comma.is_some());
    let last_kept = properties
        .iter()
        .zip(&deleted)
        .rev()
        .find(|(_, deleted)| !**deleted)
        .map(|(property, _)| property);

    match last_kept {
        Some(property) if inserted.is_empty() => {
            let followed_by_deleted = properties.last().is_some_and(|p| p.start != property.start);
            if let (true, false, Some((comma_start, comma_end))) =
                (followed_by_deleted, trailing_comma, property.comma)
            {
                edits.push(Edit::delete(comma_start, comma_end));
            }
        }
        Some(property) => {
            if property.comma.is_none() {
                edits.push(Edit::insert(property.value_end, ",".to_string()));
            }
            let count = inserted.len();
            let content: String = inserted
                .iter()
                .enumerate()
                .map(|(position, rendered)| {
                    let comma = if position + 1 < count || trailing_comma { "," } else { "" };
                    format!("{}{}{}{}", eol, indent, rendered, comma)
                })
                .collect();
            edits.push(Edit::insert(property.trailing_end, content));
        }
        None if inserted.is_empty() => {}
        None => {
            let body = inserted
                .iter()
                .map(|rendered| format!("{}{}{}", eol, indent, rendered))
                .collect::<Vec<_>>()
                .join(",");
            edits.push(Edit::insert(root.inner_start, format!("{}{}", body, eol)));
        }
    }

    Ok(Some(edits))
}

/// Apply edits that refer to disjoint ranges of `text`.
pub(crate) fn apply_edits(text: &str, mut edits: Vec<Edit>) -> LivefileResult<String> {
    edits.sort_by_key(|edit| (edit.offset, edit.length));
    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in &edits {
        if edit.offset < cursor || edit.offset + edit.length > text.len() {
            livefile_base::bail!(
                "Overlapping or out-of-range edit at byte {} (length {})",
                edit.offset,
                edit.length
            );
        }
        output.push_str(&text[cursor..edit.offset]);
        output.push_str(&edit.content);
        cursor = edit.offset + edit.length;
    }
    output.push_str(&text[cursor..]);
    Ok(output)
}
