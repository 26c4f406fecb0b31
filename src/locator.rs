//! Block locator: finds the `Submod(...)` declaration nested in an `init python` block.

use std::io::BufRead;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::types::DeclarationRange;

/// Outer block header, e.g. `init -990 python in mas_submod_utils:`.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static OUTER_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^init\s+-\d{3}\s+python(?:\s+in\s+\w+)?\s*:\s*$").expect("valid regex");
});

/// Inner block opener, matched against the line content after indentation.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static INNER_START: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^(?:(?:store\.)?mas_submod_utils\.)?Submod\(").expect("valid regex");
});

/// Where the scan currently is relative to the two nested blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Inside the declaration call, which started at `start_line`
    /// with `indent_width` leading spaces.
    InInner {
        /// Indentation of the line that opened the call.
        indent_width: usize,
        /// One-based line that opened the call.
        start_line: usize,
    },
    /// Inside an `init python` block, no declaration seen yet.
    InOuter,
    /// Looking for an `init python` header.
    Searching,
}

/// Outcome of feeding one line to the state machine.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// Keep scanning in the given state.
    Continue(ScanState),
    /// The declaration is closed; scanning stops.
    Found(DeclarationRange),
}

impl ScanState {
    /// Advance the state machine by one significant (non-blank, non-comment) line.
    fn step(self, line_no: usize, line: &str) -> Step {
        return match self {
            Self::Searching => {
                if is_outer_header(line) {
                    Step::Continue(Self::InOuter)
                } else {
                    Step::Continue(Self::Searching)
                }
            },
            Self::InOuter => {
                let indent = indent_width(line);
                if indent == 0 {
                    // Left the block; the same line may open the next one.
                    if is_outer_header(line) {
                        Step::Continue(Self::InOuter)
                    } else {
                        Step::Continue(Self::Searching)
                    }
                } else if INNER_START.is_match(line.trim_start_matches(' ')) {
                    Step::Continue(Self::InInner {
                        indent_width: indent,
                        start_line: line_no,
                    })
                } else {
                    Step::Continue(Self::InOuter)
                }
            },
            Self::InInner {
                indent_width: reference,
                start_line,
            } => {
                // Zero indent also lands here: leaving the outer block closes the call.
                if indent_width(line) <= reference {
                    Step::Found(DeclarationRange {
                        end_line: closing_line(line_no, line),
                        start_line,
                    })
                } else {
                    Step::Continue(self)
                }
            },
        };
    }
}

/// Scan `reader` line by line and return the declaration's line range.
///
/// Blank lines and `#` comment lines are ignored. The declaration must sit
/// inside an `init -NNN python:` block and ends at the first significant
/// line indented no deeper than its opening line.
///
/// # Errors
///
/// Returns `Error::DeclarationNotFound` if no header or declaration is found,
/// or if the stream ends while the declaration is still open,
/// and `Error::Io` if reading fails.
pub fn locate<R: BufRead>(file: &Path, reader: R) -> Result<DeclarationRange, Error> {
    tracing::info!("Parsing {} for the submod header", file.display());
    let mut state = ScanState::Searching;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index.saturating_add(1);
        if is_insignificant(&line) {
            continue;
        }

        match state.step(line_no, &line) {
            Step::Found(range) => {
                tracing::debug!(line = line_no, "leaving submod block");
                tracing::info!(
                    start = range.start_line,
                    end = range.end_line,
                    "Found submod declaration"
                );
                return Ok(range);
            },
            Step::Continue(next) => {
                log_transition(state, next, line_no);
                state = next;
            },
        }
    }

    if let ScanState::InInner { start_line, .. } = state {
        tracing::warn!(start = start_line, "submod declaration is never closed");
    }
    return Err(Error::DeclarationNotFound {
        file: file.to_path_buf(),
    });
}

/// End line of the declaration given the line that closed it.
/// A line starting with `)` belongs to the declaration; anything else
/// belongs to whatever follows, so the declaration ends one line earlier.
fn closing_line(line_no: usize, line: &str) -> usize {
    if line.trim_start().starts_with(')') {
        return line_no;
    }
    return line_no.saturating_sub(1);
}

/// Number of leading spaces. Tabs do not count as indentation.
fn indent_width(line: &str) -> usize {
    return line.len().saturating_sub(line.trim_start_matches(' ').len());
}

/// Blank lines and whole-line comments never affect block structure.
fn is_insignificant(line: &str) -> bool {
    let trimmed = line.trim();
    return trimmed.is_empty() || trimmed.starts_with('#');
}

/// Whether `line` opens an `init python` block.
fn is_outer_header(line: &str) -> bool {
    return OUTER_HEADER.is_match(line);
}

/// Emit a debug event when the scan enters or leaves a block.
fn log_transition(from: ScanState, to: ScanState, line_no: usize) {
    match (from, to) {
        (ScanState::Searching, ScanState::InOuter) => {
            tracing::debug!(line = line_no, "entering 'init python' block");
        },
        (ScanState::InOuter, ScanState::Searching) => {
            tracing::debug!(line = line_no, "leaving 'init python' block");
        },
        (ScanState::InOuter, ScanState::InInner { .. }) => {
            tracing::debug!(line = line_no, "entering submod block");
        },
        _ => {},
    }
}
