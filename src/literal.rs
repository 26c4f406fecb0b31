//! Literal recovery: classifies syntax nodes into `LiteralExpr` and resolves
//! them into JSON values.

use serde_json::{Map, Number, Value};
use tree_sitter::Node;

use crate::error::Error;
use crate::types::LiteralExpr;

impl LiteralExpr {
    /// Classify a syntax node. Anything that is not a plain literal, or a
    /// container of them, becomes `Unsupported`.
    pub fn from_node(node: Node<'_>, source: &str) -> Self {
        let text = node_text(node, source);
        let unsupported = || return Self::Unsupported(text.to_string());

        return match node.kind() {
            "string" => decode_string(text).map_or_else(unsupported, |s| return Self::Constant(Value::String(s))),
            "concatenated_string" => concatenated_string(node, source).unwrap_or_else(unsupported),
            "integer" => parse_integer(text).map_or_else(unsupported, Self::Constant),
            "float" => parse_float(text).map_or_else(unsupported, Self::Constant),
            "true" => Self::Constant(Value::Bool(true)),
            "false" => Self::Constant(Value::Bool(false)),
            "none" => Self::Constant(Value::Null),
            "list" | "tuple" | "set" => Self::Sequence(
                code_children(node)
                    .into_iter()
                    .map(|child| return Self::from_node(child, source))
                    .collect(),
            ),
            "dictionary" => Self::Mapping(
                code_children(node)
                    .into_iter()
                    .map(|child| return dictionary_entry(child, source))
                    .collect(),
            ),
            "parenthesized_expression" => match code_children(node).as_slice() {
                [inner] => Self::from_node(*inner, source),
                _ => unsupported(),
            },
            _ => unsupported(),
        };
    }

    /// Resolve into a JSON value. `Unsupported` resolves to `null`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnhashableKey` if a mapping uses a list or dict as a key.
    pub fn resolve(&self) -> Result<Value, Error> {
        return match self {
            Self::Constant(value) => Ok(value.clone()),
            Self::Sequence(items) => Ok(Value::Array(
                items.iter().map(Self::resolve).collect::<Result<_, _>>()?,
            )),
            Self::Mapping(pairs) => {
                let mut object = Map::new();
                for (key, value) in pairs {
                    object.insert(object_key(key.resolve()?)?, value.resolve()?);
                }
                Ok(Value::Object(object))
            },
            Self::Unsupported(text) => {
                tracing::debug!(%text, "not a literal, resolving to null");
                Ok(Value::Null)
            },
        };
    }
}

/// Named children that carry code, skipping comments.
pub(crate) fn code_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    return node
        .named_children(&mut cursor)
        .filter(|child| return child.kind() != "comment")
        .collect();
}

/// Implicitly concatenated string literals, e.g. `"a" "b"`.
fn concatenated_string(node: Node<'_>, source: &str) -> Option<LiteralExpr> {
    let mut joined = String::new();
    for part in code_children(node) {
        joined.push_str(&decode_string(node_text(part, source))?);
    }
    return Some(LiteralExpr::Constant(Value::String(joined)));
}

/// Decode a Python string literal, prefix and quotes included.
/// Byte strings and f-strings have no plain constant value and yield `None`.
fn decode_string(literal: &str) -> Option<String> {
    let quote_at = literal.find(['"', '\''])?;
    let prefix = literal.get(..quote_at)?.to_ascii_lowercase();
    if prefix.contains(['b', 'f']) {
        return None;
    }

    let quoted = literal.get(quote_at..)?;
    let delimiter_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") { 3 } else { 1 };
    let body = quoted.get(delimiter_len..quoted.len().checked_sub(delimiter_len)?)?;

    if prefix.contains('r') {
        return Some(body.to_string());
    }
    return Some(unescape(body));
}

/// One `key: value` entry of a dict literal. `**mapping` unpacking has no
/// literal key and resolves like a `None` key with an unsupported value.
fn dictionary_entry(node: Node<'_>, source: &str) -> (LiteralExpr, LiteralExpr) {
    let field = |name: &str| {
        return node.child_by_field_name(name).map_or_else(
            || return LiteralExpr::Constant(Value::Null),
            |child| return LiteralExpr::from_node(child, source),
        );
    };
    if node.kind() != "pair" {
        return (LiteralExpr::Constant(Value::Null), LiteralExpr::Unsupported(node_text(node, source).to_string()));
    }
    return (field("key"), field("value"));
}

/// Text of `node` within `source`.
fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    return source.get(node.byte_range()).unwrap_or_default();
}

/// Convert a resolved dict key into a JSON object key, the way JSON
/// encoders stringify scalar keys.
///
/// # Errors
///
/// Returns `Error::UnhashableKey` for list and dict keys.
fn object_key(key: Value) -> Result<String, Error> {
    return match key {
        Value::String(s) => Ok(s),
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) | Value::Object(_) => Err(Error::UnhashableKey {
            key: key.to_string(),
        }),
    };
}

/// Parse a float literal. Imaginary literals and values outside the
/// finite range have no JSON form.
fn parse_float(text: &str) -> Option<Value> {
    let digits = text.replace('_', "");
    if digits.ends_with(['j', 'J']) {
        return None;
    }
    let value: f64 = digits.parse().ok()?;
    return Number::from_f64(value).map(Value::Number);
}

/// Parse an integer literal in any base. Values beyond `u64` are unsupported.
fn parse_integer(text: &str) -> Option<Value> {
    let digits = text.replace('_', "").to_ascii_lowercase();
    if digits.ends_with(['j', 'l']) {
        return None;
    }

    let (radix, body) = match digits.get(..2) {
        Some("0x") => (16, digits.get(2..)?),
        Some("0o") => (8, digits.get(2..)?),
        Some("0b") => (2, digits.get(2..)?),
        _ => (10, digits.as_str()),
    };
    return u64::from_str_radix(body, radix).ok().map(|n| return Value::Number(n.into()));
}

/// Read exactly `count` hex digits and turn them into a char.
fn take_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: usize) -> Option<char> {
    let mut code = 0_u32;
    for _ in 0..count {
        let digit = chars.peek()?.to_digit(16)?;
        chars.next();
        code = code.checked_mul(16)?.checked_add(digit)?;
    }
    return char::from_u32(code);
}

/// Process backslash escapes. Unknown or malformed escapes are kept as written.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        match escape {
            '\n' => {},
            '\\' | '\'' | '"' => out.push(escape),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => out.push(unescape_octal(escape, &mut chars)),
            'x' | 'u' | 'U' => {
                let width = match escape {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut lookahead = chars.clone();
                if let Some(decoded) = take_hex(&mut lookahead, width) {
                    chars = lookahead;
                    out.push(decoded);
                } else {
                    out.push('\\');
                    out.push(escape);
                }
            },
            other => {
                out.push('\\');
                out.push(other);
            },
        }
    }

    return out;
}

/// Up to three octal digits, the first already consumed.
fn unescape_octal(first: char, chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> char {
    let mut code = first.to_digit(8).unwrap_or_default();
    for _ in 0..2 {
        let Some(digit) = chars.peek().and_then(|c| return c.to_digit(8)) else {
            break;
        };
        chars.next();
        code = code.saturating_mul(8).saturating_add(digit);
    }
    return char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
}
