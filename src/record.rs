//! Submod record: the parsed declaration merged with bundle metadata,
//! and its `header.json` serialization.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::types::ArgumentMapping;

/// Header format version written into every record.
pub const HEADER_VERSION: u64 = 1;

/// Indentation used when writing the header.
const JSON_INDENT: &[u8] = b"    ";

/// The final submod header. Keys keep insertion order: `header_version`,
/// `modules`, then the declaration's fields. No field is validated here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubmodRecord {
    /// All header fields in output order.
    fields: Map<String, Value>,
}

impl SubmodRecord {
    /// Merge `mapping` over the fixed header fields. On a key collision the
    /// mapping's value wins and keeps the fixed field's position.
    pub fn build(mapping: ArgumentMapping, modules: &[String]) -> Self {
        let mut fields = Map::new();
        fields.insert("header_version".to_string(), Value::from(HEADER_VERSION));
        fields.insert(
            "modules".to_string(),
            Value::Array(modules.iter().cloned().map(Value::String).collect()),
        );
        for (key, value) in mapping {
            fields.insert(key, value);
        }
        return Self { fields };
    }

    /// All header fields in output order.
    pub const fn fields(&self) -> &Map<String, Value> {
        return &self.fields;
    }

    /// The submod's `name`, if the declaration gave it as a string.
    pub fn name(&self) -> Option<&str> {
        return self.fields.get("name").and_then(Value::as_str);
    }

    /// Serialize as pretty JSON with four-space indentation.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String, Error> {
        let mut out = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(JSON_INDENT));
        self.serialize(&mut serializer)?;
        return String::from_utf8(out).map_err(|err| {
            return Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err));
        });
    }

    /// Write the header as `file_name` inside `dir`, unless `dry_run`.
    /// Returns the path the header is (or would be) written to.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn write(&self, dir: &Path, file_name: &str, dry_run: bool) -> Result<PathBuf, Error> {
        let path = dir.join(file_name);
        let content = self.to_pretty_json()?;
        tracing::info!("Submod header:\n{content}");

        if !dry_run {
            std::fs::write(&path, content)?;
            tracing::info!("Wrote {}", path.display());
        }
        return Ok(path);
    }
}
