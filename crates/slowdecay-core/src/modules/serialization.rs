use crate::domain::{ProfileError, ProfileResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Writes `value` as pretty-printed JSON with a trailing newline.
pub fn write_json_artifact<T: Serialize>(path: &Path, value: &T) -> ProfileResult<()> {
    let mut encoded = serde_json::to_string_pretty(value).map_err(|source| {
        ProfileError::internal(
            "SYS.JSON_ENCODE",
            format!("failed to encode '{}': {}", path.display(), source),
        )
    })?;
    encoded.push('\n');
    fs::write(path, encoded).map_err(|source| {
        ProfileError::io_system(
            "IO.ARTIFACT_WRITE",
            format!("failed to write '{}': {}", path.display(), source),
        )
    })
}

pub fn read_json_artifact<T: DeserializeOwned>(path: &Path) -> ProfileResult<T> {
    let source = fs::read_to_string(path).map_err(|source| {
        ProfileError::io_system(
            "IO.ARTIFACT_READ",
            format!("failed to read '{}': {}", path.display(), source),
        )
    })?;
    serde_json::from_str(&source).map_err(|source| {
        ProfileError::input_validation(
            "INPUT.ARTIFACT_PARSE",
            format!("failed to parse '{}': {}", path.display(), source),
        )
    })
}
