//! Loading JSON and TOML documents from disk.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use dictkit_types::{Mapping, Value};
use tracing::debug;

/// Read a document, choosing the parser by file extension.
///
/// The top level must be an object (JSON) or a table (TOML).
pub fn load_document(path: impl AsRef<Path>) -> anyhow::Result<Mapping> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let value = match extension.as_deref() {
        Some("json") => {
            let json: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON in {}", path.display()))?;
            Value::from(json)
        }
        Some("toml") => {
            let table: toml::Table = toml::from_str(&text)
                .with_context(|| format!("invalid TOML in {}", path.display()))?;
            Value::from(toml::Value::Table(table))
        }
        _ => bail!("unsupported document type: {}", path.display()),
    };

    match value {
        Value::Map(mapping) => {
            debug!(path = %path.display(), keys = mapping.len(), "loaded document");
            Ok(mapping)
        }
        other => bail!(
            "{} must contain a mapping at the top level, found {}",
            path.display(),
            other.kind()
        ),
    }
}
