//! Converter settings read from an optional TOML file.

use std::path::Path;

use crate::error::Error;

/// Name of the optional converter config file, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".submod-converter.toml";

/// Converter configuration loaded from `.submod-converter.toml`.
/// Controls which extensions count as scripts and how outputs are named.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extension of compiled scripts, which are deleted from the bundle.
    pub compiled_ext: String,
    /// File name of the JSON header written into the bundle.
    pub header_file_name: String,
    /// Extension scripts are renamed to, turning them into modules.
    pub module_ext: String,
    /// Extension of source scripts.
    pub script_ext: String,
    /// Prefix of the staging folder created before the submod name is known.
    pub staging_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            compiled_ext: "rpyc".to_string(),
            header_file_name: "header.json".to_string(),
            module_ext: "rpym".to_string(),
            script_ext: "rpy".to_string(),
            staging_prefix: "submod-converter".to_string(),
        };
    }
}

impl Config {
    /// Load config from `.submod-converter.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded converter config");
        return Ok(config);
    }
}
