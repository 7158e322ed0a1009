//! JSON persistence for outlines and analysis results.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};
use crate::model::Outline;

/// Indent width of outline artifacts.
pub const OUTLINE_INDENT: usize = 4;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with two-space indentation
    #[default]
    Pretty,
    /// Pretty-printed JSON with the given indentation width
    Indent(usize),
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a value to JSON. Non-ASCII text is kept as-is.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
        JsonFormat::Indent(width) => {
            let indent = " ".repeat(width);
            let mut buf = Vec::new();
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut ser)?;
            String::from_utf8(buf).map_err(|e| Error::Other(e.to_string()))?
        }
    };
    Ok(json)
}

/// Write a value as JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    path: P,
    value: &T,
    format: JsonFormat,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_json(value, format)?)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Read a JSON file into a value.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Write an outline artifact.
pub fn write_outline<P: AsRef<Path>>(path: P, outline: &Outline) -> Result<()> {
    write_json(path, outline, JsonFormat::Indent(OUTLINE_INDENT))
}

/// Read an outline artifact.
pub fn read_outline<P: AsRef<Path>>(path: P) -> Result<Outline> {
    read_json(path)
}
