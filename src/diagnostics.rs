use crate::config::CONFIG_FILE_NAME;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::DeclarationNotFound { file } => render_declaration_not_found(&file.display().to_string()),
        Error::DeclarationSyntax { reason, text } => render_declaration_syntax(reason, text),
        Error::TooManyPositional { max, position } => render_too_many_positional(*max, *position),
        Error::UnhashableKey { key } => render_unhashable_key(key),
        Error::MissingName => render_missing_name(),
        _ => render_generic(e),
    };
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::PathNotFound { path } => format!("\
# Error: Path Not Found

`{}` does not exist.

## Fix

Pass the submod folder first, then the header script relative to it:

    mas-submod-converter path/to/submod header.rpy
", path.display()),

        Error::TomlDe(err) => format!("\
# Error: Invalid Config

{err}

## Fix

Correct or delete `{CONFIG_FILE_NAME}`.
"),

        Error::RangeOutOfBounds { start, end, available } => format!("\
# Error: Declaration Range Out Of Bounds

Lines {start}..={end} were requested but the header has {available} lines.
"),

        Error::ParseFailed { reason } => format!("\
# Error: Parser Unavailable

{reason}
"),

        Error::Io(err) => format!("\
# Error: I/O

{err}
"),

        Error::Walk(err) => format!("\
# Error: Directory Walk

{err}
"),

        Error::Json(err) => format!("\
# Error: JSON Serialization

{err}
"),

        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_declaration_not_found(file: &str) -> String {
    return format!("\
# Error: Submod Declaration Not Found

No `Submod(...)` declaration was found in `{file}`.

The declaration must start a line inside an `init` python block, for example:

    init -990 python in mas_submod_utils:
        Submod(
            author=\"...\",
            name=\"...\",
            version=\"...\"
        )

## Fix

Check that the header file is the one holding the declaration, that the
`init` priority is negative, and that the call is closed.
");
}

fn render_declaration_syntax(reason: &str, text: &str) -> String {
    return format!("\
# Error: Invalid Declaration

The declaration could not be parsed: {reason}.

## Declaration

    {text}
");
}

fn render_missing_name() -> String {
    return "\
# Error: Missing Name

The declaration has no string `name`, so the output folder cannot be named.

## Fix

Add `name=\"...\"` to the `Submod(...)` call.
"
    .to_string();
}

fn render_too_many_positional(max: usize, position: usize) -> String {
    return format!("\
# Error: Too Many Positional Arguments

Argument #{position} has no field name; only the first {max} positional
arguments map to `author`, `name`, and `version`.

## Fix

Pass the remaining arguments by keyword, e.g. `description=\"...\"`.
");
}

fn render_unhashable_key(key: &str) -> String {
    return format!("\
# Error: Unhashable Dict Key

`{key}` cannot be used as a dict key.

## Fix

Use a string, number, or boolean key.
");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn not_found_names_the_file() {
        let md = render_error(&Error::DeclarationNotFound {
            file: PathBuf::from("sub/header.rpy"),
        });
        assert!(md.starts_with("# Error: Submod Declaration Not Found"));
        assert!(md.contains("`sub/header.rpy`"));
        assert!(md.contains("## Fix"));
    }

    #[test]
    fn positional_error_suggests_keywords() {
        let md = render_error(&Error::TooManyPositional { max: 3, position: 4 });
        assert!(md.contains("Argument #4"));
        assert!(md.contains("description="));
    }

    #[test]
    fn io_error_falls_back_to_generic() {
        let md = render_error(&Error::Io(std::io::Error::other("disk on fire")));
        assert!(md.starts_with("# Error: I/O"));
        assert!(md.contains("disk on fire"));
    }
}
