//! Reading JSON and YAML input files

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Read a file as JSON, or as YAML when the extension says so
pub fn read_input<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("parsing YAML in {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("parsing JSON in {}", path.display()))
    }
}
