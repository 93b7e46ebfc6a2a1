//! Records files: the YAML list of hosts an inventory is built from

use crate::error::{Error, Result};
use crate::Value;
use std::path::Path;

/// Parse the content of a records file.
///
/// An empty document is an empty list. `path` is only used in errors.
///
/// # Errors
///
/// [`Error::Yaml`] for invalid YAML, [`Error::NotAList`] for a document that
/// is not a sequence.
pub fn parse_records(content: &str, path: &Path) -> Result<Vec<Value>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: Value = serde_yaml::from_str(content).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    match doc {
        Value::Null => Ok(Vec::new()),
        Value::List(records) => Ok(records),
        other => Err(Error::NotAList {
            path: path.to_path_buf(),
            found: other.type_name(),
        }),
    }
}

/// Read and parse a records file.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, then as [`parse_records`].
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&content, path)
}

/// Render records the way data files are written: a `---` line, a blank
/// line, then the YAML list.
///
/// # Errors
///
/// Returns the serializer error (only possible for unrepresentable values).
pub fn render_records(records: &[Value]) -> std::result::Result<String, serde_yaml::Error> {
    Ok(format!("---\n\n{}", serde_yaml::to_string(records)?))
}

/// Write records back to `path` in the [`render_records`] layout.
///
/// # Errors
///
/// [`Error::Yaml`] if serialization fails, [`Error::Io`] if writing fails.
pub fn save_records(path: impl AsRef<Path>, records: &[Value]) -> Result<()> {
    let path = path.as_ref();
    let content = render_records(records).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
