//! Declaration extraction: pulls the declaration text out of a located range
//! and comments the original lines out in place.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use crate::error::Error;
use crate::types::DeclarationRange;

/// Statement inserted ahead of the commented declaration so the enclosing
/// block never ends up empty.
const PLACEHOLDER: &str = "pass";

/// Prefix that turns a script line into a comment.
const COMMENT_PREFIX: &str = "# ";

/// A seekable text resource that can be rewritten from scratch.
pub trait TextResource: Read + Write + Seek {
    /// Drop all current contents.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the resource cannot be truncated.
    fn truncate(&mut self) -> std::io::Result<()>;
}

impl TextResource for File {
    fn truncate(&mut self) -> std::io::Result<()> {
        return self.set_len(0);
    }
}

impl TextResource for Cursor<Vec<u8>> {
    fn truncate(&mut self) -> std::io::Result<()> {
        self.get_mut().clear();
        return Ok(());
    }
}

/// A string literal left open by an earlier part of the declaration.
#[derive(Debug, Clone, Copy)]
struct OpenString {
    /// The quote character that opened it.
    quote: char,
    /// Whether it was opened with three quotes and may span lines.
    triple: bool,
}

/// Extract the declaration text from `range` and comment those lines out.
///
/// Lines outside the range are written back byte-for-byte. The first line
/// of the range that carries code gets a `pass` placeholder inserted above
/// it at the same indentation. With `dry_run` the stream is only read.
///
/// # Errors
///
/// Returns `Error::RangeOutOfBounds` if the range is empty or past the end
/// of the stream, and `Error::Io` if reading or rewriting fails.
pub fn extract_and_neutralize<S: TextResource>(
    stream: &mut S,
    range: DeclarationRange,
    dry_run: bool,
) -> Result<String, Error> {
    stream.seek(SeekFrom::Start(0))?;
    let mut content = String::new();
    stream.read_to_string(&mut content)?;

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    if range.start_line == 0 || range.start_line > range.end_line || range.end_line > lines.len() {
        return Err(Error::RangeOutOfBounds {
            available: lines.len(),
            end: range.end_line,
            start: range.start_line,
        });
    }

    let mut rewritten = String::with_capacity(content.len().saturating_add(64));
    let mut declaration = String::new();
    let mut open_string: Option<OpenString> = None;
    let mut placeholder_written = false;

    for (index, line) in lines.iter().enumerate() {
        if !range.contains(index.saturating_add(1)) {
            rewritten.push_str(line);
            continue;
        }

        let code = code_portion(line.trim_matches([' ', '\t', '\r', '\n']), &mut open_string);
        if !code.is_empty() {
            if !placeholder_written {
                write_placeholder(&mut rewritten, line);
                placeholder_written = true;
            }
            declaration.push_str(code);
        }
        rewritten.push_str(COMMENT_PREFIX);
        rewritten.push_str(line);
    }

    if dry_run {
        tracing::info!("Dry run: leaving the old definition in place");
    } else {
        tracing::info!("Commenting out the old definition");
        stream.seek(SeekFrom::Start(0))?;
        stream.truncate()?;
        stream.write_all(rewritten.as_bytes())?;
        stream.flush()?;
    }

    return Ok(declaration.trim().to_string());
}

/// Return the part of a trimmed line before any `#` comment, skipping `#`
/// inside string literals. `open` carries a triple-quoted string across lines.
fn code_portion<'a>(line: &'a str, open: &mut Option<OpenString>) -> &'a str {
    let mut chars = line.char_indices();

    while let Some((at, ch)) = chars.next() {
        let rest = line.get(at..).unwrap_or_default();
        match *open {
            Some(string) => {
                if ch == '\\' {
                    chars.next();
                } else if ch == string.quote {
                    if !string.triple {
                        *open = None;
                    } else if rest.starts_with(triple_quote(ch)) {
                        *open = None;
                        chars.nth(1);
                    }
                }
            },
            None => {
                if ch == '#' {
                    return line.get(..at).unwrap_or_default().trim_end();
                }
                if ch == '"' || ch == '\'' {
                    let triple = rest.starts_with(triple_quote(ch));
                    if triple {
                        chars.nth(1);
                    }
                    *open = Some(OpenString { quote: ch, triple });
                }
            },
        }
    }

    // Only triple-quoted strings survive a line break.
    if open.is_some_and(|string| return !string.triple) {
        *open = None;
    }
    return line;
}

/// The three-quote delimiter for `quote`.
const fn triple_quote(quote: char) -> &'static str {
    if quote == '"' {
        return "\"\"\"";
    }
    return "'''";
}

/// Write the placeholder statement indented like `line`, ending the same way.
fn write_placeholder(out: &mut String, line: &str) {
    let indent = line.len().saturating_sub(line.trim_start_matches(' ').len());
    out.extend(std::iter::repeat_n(' ', indent));
    out.push_str(PLACEHOLDER);
    out.push_str(if line.ends_with("\r\n") { "\r\n" } else { "\n" });
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::locator;

    const HEADER: &str = "\
# header for Example
init -990 python in mas_submod_utils:
    Submod(
        author=\"me\",  # who wrote it
        # the display name
        name=\"Example # One\",

        version=\"1.0.0\"
    )

label example_start:
    return
";

    fn range(start_line: usize, end_line: usize) -> DeclarationRange {
        return DeclarationRange { end_line, start_line };
    }

    fn cursor(text: &str) -> Cursor<Vec<u8>> {
        return Cursor::new(text.as_bytes().to_vec());
    }

    fn contents(stream: &Cursor<Vec<u8>>) -> String {
        return String::from_utf8(stream.get_ref().clone()).unwrap();
    }

    #[test]
    fn extracts_flattened_code_without_comments() {
        let mut stream = cursor(HEADER);
        let text = extract_and_neutralize(&mut stream, range(3, 9), false).unwrap();
        assert_eq!(text, "Submod(author=\"me\",name=\"Example # One\",version=\"1.0.0\")");
    }

    #[test]
    fn comments_out_range_and_inserts_placeholder() {
        let mut stream = cursor(HEADER);
        extract_and_neutralize(&mut stream, range(3, 9), false).unwrap();

        let expected = "\
# header for Example
init -990 python in mas_submod_utils:
    pass
#     Submod(
#         author=\"me\",  # who wrote it
#         # the display name
#         name=\"Example # One\",
# \n#         version=\"1.0.0\"
#     )

label example_start:
    return
";
        assert_eq!(contents(&stream), expected);
    }

    #[test]
    fn lines_outside_range_are_untouched() {
        let mut stream = cursor(HEADER);
        extract_and_neutralize(&mut stream, range(3, 9), false).unwrap();

        let after = contents(&stream);
        let before_lines: Vec<&str> = HEADER.split_inclusive('\n').collect();
        let after_lines: Vec<&str> = after.split_inclusive('\n').collect();
        assert_eq!(before_lines[..2], after_lines[..2]);
        // Seven commented lines plus the placeholder.
        assert_eq!(before_lines[9..], after_lines[10..]);
    }

    #[test]
    fn placeholder_goes_before_first_code_line() {
        let text = "init -990 python:\n    # leading note\n    Submod(author=\"me\")\n";
        let mut stream = cursor(text);
        let declaration = extract_and_neutralize(&mut stream, range(2, 3), false).unwrap();

        assert_eq!(declaration, "Submod(author=\"me\")");
        assert_eq!(
            contents(&stream),
            "init -990 python:\n#     # leading note\n    pass\n#     Submod(author=\"me\")\n"
        );
    }

    #[test]
    fn dry_run_leaves_stream_untouched() {
        let mut stream = cursor(HEADER);
        let text = extract_and_neutralize(&mut stream, range(3, 9), true).unwrap();
        assert!(text.starts_with("Submod("));
        assert_eq!(contents(&stream), HEADER);
    }

    #[test]
    fn crlf_lines_keep_their_endings() {
        let text = "init -990 python:\r\n    Submod(\r\n        author=\"me\"\r\n    )\r\nlabel a:\r\n";
        let mut stream = cursor(text);
        let declaration = extract_and_neutralize(&mut stream, range(2, 4), false).unwrap();

        assert_eq!(declaration, "Submod(author=\"me\")");
        assert_eq!(
            contents(&stream),
            "init -990 python:\r\n    pass\r\n#     Submod(\r\n#         author=\"me\"\r\n#     )\r\nlabel a:\r\n"
        );
    }

    #[test]
    fn last_line_without_newline() {
        let text = "init -990 python:\n    Submod(author=\"me\")";
        let mut stream = cursor(text);
        extract_and_neutralize(&mut stream, range(2, 2), false).unwrap();
        assert_eq!(contents(&stream), "init -990 python:\n    pass\n#     Submod(author=\"me\")");
    }

    #[test]
    fn range_past_end_is_rejected() {
        let mut stream = cursor("init -990 python:\n    pass\n");
        let result = extract_and_neutralize(&mut stream, range(2, 5), false);
        assert!(matches!(result, Err(Error::RangeOutOfBounds { available: 2, .. })));
        assert_eq!(contents(&stream), "init -990 python:\n    pass\n");
    }

    #[test]
    fn triple_quoted_string_spanning_lines_keeps_hash() {
        let mut open = None;
        assert_eq!(code_portion("description=\"\"\"first # not a comment", &mut open), "description=\"\"\"first # not a comment");
        assert!(open.is_some());
        assert_eq!(code_portion("still # inside\"\"\", # real comment", &mut open), "still # inside\"\"\",");
        assert!(open.is_none());
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let mut open = None;
        assert_eq!(code_portion(r#"name="a \" # b", # c"#, &mut open), r#"name="a \" # b","#);
    }

    #[test]
    fn second_pass_after_neutralizing_finds_nothing() {
        let mut stream = cursor(HEADER);
        let found = locator::locate(Path::new("header.rpy"), Cursor::new(HEADER)).unwrap();
        extract_and_neutralize(&mut stream, found, false).unwrap();

        let rewritten = contents(&stream);
        let again = locator::locate(Path::new("header.rpy"), Cursor::new(rewritten));
        assert!(matches!(again, Err(Error::DeclarationNotFound { .. })));
    }

    #[test]
    fn dry_run_then_real_run_matches_single_run() {
        let found = locator::locate(Path::new("header.rpy"), Cursor::new(HEADER)).unwrap();

        let mut twice = cursor(HEADER);
        let dry = extract_and_neutralize(&mut twice, found, true).unwrap();
        let again = locator::locate(Path::new("header.rpy"), Cursor::new(contents(&twice))).unwrap();
        let real = extract_and_neutralize(&mut twice, again, false).unwrap();

        let mut once = cursor(HEADER);
        let single = extract_and_neutralize(&mut once, found, false).unwrap();

        assert_eq!(dry, single);
        assert_eq!(real, single);
        assert_eq!(contents(&twice), contents(&once));
    }
}
