/// Core domain types shared by the locator, neutralizer, parser, and record builder.
use serde_json::{Map, Value};

/// Field names bound to positional declaration arguments, in order.
pub const POSITIONAL_FIELDS: [&str; 3] = ["author", "name", "version"];

/// Parsed declaration arguments, keyed by field name in declaration order.
pub type ArgumentMapping = Map<String, Value>;

/// Inclusive, one-based line range of the `Submod(...)` declaration.
/// Produced by the locator and consumed once by the neutralizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationRange {
    /// Last line of the declaration, inclusive.
    pub end_line: usize,
    /// First line of the declaration.
    pub start_line: usize,
}

impl DeclarationRange {
    /// Whether the one-based `line` falls inside the range.
    pub const fn contains(&self, line: usize) -> bool {
        return line >= self.start_line && line <= self.end_line;
    }
}

/// A literal expression recovered from the declaration's syntax tree.
/// Closed set: anything the converter does not understand is `Unsupported`.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralExpr {
    /// A string, number, boolean, or `None`.
    Constant(Value),
    /// A dict literal, as ordered key/value pairs.
    Mapping(Vec<(LiteralExpr, LiteralExpr)>),
    /// A list, tuple, or set literal.
    Sequence(Vec<LiteralExpr>),
    /// Any other expression, carrying its source text for diagnostics.
    Unsupported(String),
}
