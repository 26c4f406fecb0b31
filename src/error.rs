/// Crate-level error types for submod conversion diagnostics.
use std::path::PathBuf;

/// Every failure carries enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, line, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No `Submod(...)` declaration was found inside an `init python` block,
    /// or the declaration was still open when the file ended.
    #[error("submod declaration not found in {}", file.display())]
    DeclarationNotFound {
        /// Header file that was scanned.
        file: PathBuf,
    },

    /// The extracted declaration is not a single call expression.
    #[error("declaration syntax: {reason}: `{text}`")]
    DeclarationSyntax {
        /// Description of the syntax problem.
        reason: String,
        /// Flattened declaration text handed to the parser.
        text: String,
    },

    /// A JSON value could not be serialized.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The built record has no string `name`, so the output folder cannot be named.
    #[error("submod record has no string `name` field")]
    MissingName,

    /// Tree-sitter could not be set up for parsing the declaration.
    #[error("parse failed: {reason}")]
    ParseFailed {
        /// Description of the parser failure.
        reason: String,
    },

    /// An input path given on the command line does not exist.
    #[error("path not found: {}", path.display())]
    PathNotFound {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// A declaration range refers to lines the stream does not have.
    #[error("declaration range {start}..={end} exceeds {available} lines")]
    RangeOutOfBounds {
        /// Number of lines the stream actually holds.
        available: usize,
        /// Last line of the requested range.
        end: usize,
        /// First line of the requested range.
        start: usize,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// More positional arguments than there are positional field names.
    #[error("positional argument #{position} has no field name (at most {max} allowed)")]
    TooManyPositional {
        /// Number of positional names available.
        max: usize,
        /// One-based position of the offending argument.
        position: usize,
    },

    /// A list, tuple, set, or dict was used as a dict key.
    #[error("unhashable dict key: `{key}`")]
    UnhashableKey {
        /// Source text of the offending key.
        key: String,
    },

    /// Directory traversal failed.
    #[error("walk: {0}")]
    Walk(
        /// The wrapped walkdir error.
        #[from]
        walkdir::Error,
    ),
}
