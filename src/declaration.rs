//! Declaration parser: turns `Submod(...)` call text into an argument mapping.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::error::Error;
use crate::grammar;
use crate::literal::code_children;
use crate::types::{ArgumentMapping, LiteralExpr, POSITIONAL_FIELDS};

/// Parse declaration text as a single call and map its arguments by name.
///
/// Positional arguments bind to `author`, `name`, and `version` in order;
/// keyword arguments bind to their own name and win over positional ones.
/// The callee is not inspected. Values that are not literals map to `null`.
///
/// # Errors
///
/// Returns `Error::DeclarationSyntax` if the text is not exactly one call
/// expression, `Error::TooManyPositional` for a fourth positional argument,
/// `Error::UnhashableKey` for dict literals keyed by containers,
/// or `Error::ParseFailed` if the grammar cannot be loaded.
pub fn parse(text: &str) -> Result<ArgumentMapping, Error> {
    let syntax_error = |reason: &str| {
        return Error::DeclarationSyntax {
            reason: reason.to_string(),
            text: text.to_string(),
        };
    };

    let mut parser = grammar::python_parser()?;
    let tree = parser.parse(text, None).ok_or_else(|| return Error::ParseFailed {
        reason: "tree-sitter returned no tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(syntax_error("invalid syntax"));
    }

    let statements = code_children(root);
    let [statement] = statements.as_slice() else {
        return Err(syntax_error("expected exactly one statement"));
    };
    if statement.kind() != "expression_statement" {
        return Err(syntax_error("expected an expression statement"));
    }
    let expressions = code_children(*statement);
    let [call] = expressions.as_slice() else {
        return Err(syntax_error("expected a single expression"));
    };
    if call.kind() != "call" {
        return Err(syntax_error("expected a call expression"));
    }
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Err(syntax_error("expected a call with an argument list"));
    };

    // `Submod(x for x in y)` passes the generator as the only argument.
    let (positional, keywords) = match arguments.kind() {
        "argument_list" => split_arguments(arguments, text).map_err(|reason| return syntax_error(&reason))?,
        "generator_expression" => (vec![LiteralExpr::from_node(arguments, text)], Vec::new()),
        _ => return Err(syntax_error("expected a call with an argument list")),
    };

    let mut mapping = ArgumentMapping::new();
    for (index, value) in positional.iter().enumerate() {
        let Some(field) = POSITIONAL_FIELDS.get(index) else {
            return Err(Error::TooManyPositional {
                max: POSITIONAL_FIELDS.len(),
                position: index.saturating_add(1),
            });
        };
        mapping.insert((*field).to_string(), value.resolve()?);
    }
    for (name, value) in keywords {
        mapping.insert(name, value.resolve()?);
    }

    tracing::debug!(?mapping, "parsed submod declaration");
    return Ok(mapping);
}

/// Positional values and keyword arguments, in source order.
type SplitArguments = (Vec<LiteralExpr>, Vec<(String, LiteralExpr)>);

/// Separate an argument list into positional values and keyword arguments,
/// enforcing the call-syntax rules the grammar itself accepts.
///
/// # Errors
///
/// Returns a reason string for `**` unpacking, a positional argument after a
/// keyword argument, or a repeated keyword.
fn split_arguments(arguments: Node<'_>, source: &str) -> Result<SplitArguments, String> {
    let mut positional = Vec::new();
    let mut keywords: Vec<(String, LiteralExpr)> = Vec::new();
    let mut seen = HashSet::new();

    for argument in code_children(arguments) {
        match argument.kind() {
            "keyword_argument" => {
                let name = argument
                    .child_by_field_name("name")
                    .and_then(|n| return source.get(n.byte_range()))
                    .ok_or_else(|| return "keyword argument without a name".to_string())?;
                if !seen.insert(name) {
                    return Err(format!("keyword argument repeated: {name}"));
                }
                let value = argument.child_by_field_name("value").map_or_else(
                    || return LiteralExpr::Unsupported(String::new()),
                    |v| return LiteralExpr::from_node(v, source),
                );
                keywords.push((name.to_string(), value));
            },
            "dictionary_splat" => {
                return Err("`**` unpacking has no field name".to_string());
            },
            // `*values` may follow keywords; it still takes a position.
            "list_splat" => positional.push(LiteralExpr::from_node(argument, source)),
            _ => {
                if !keywords.is_empty() {
                    return Err("positional argument follows keyword argument".to_string());
                }
                positional.push(LiteralExpr::from_node(argument, source));
            },
        }
    }

    return Ok((positional, keywords));
}
