use crate::domain::{AlignmentResult, ProfileError};
use globset::Glob;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_PATTERN: &str = "*.json";

#[derive(Debug, thiserror::Error)]
pub enum InputFileError {
    #[error("failed to read alignment input '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse alignment input '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid input pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },
    #[error("failed to list input directory '{}': {source}", path.display())]
    ListDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<InputFileError> for ProfileError {
    fn from(error: InputFileError) -> Self {
        let message = error.to_string();
        match error {
            InputFileError::Read { .. } => ProfileError::io_system("IO.INPUT_READ", message),
            InputFileError::ListDirectory { .. } => {
                ProfileError::io_system("IO.INPUT_DIRECTORY", message)
            }
            InputFileError::Parse { .. } => {
                ProfileError::input_validation("INPUT.ALIGNMENT_PARSE", message)
            }
            InputFileError::Pattern { .. } => {
                ProfileError::input_validation("INPUT.INPUT_PATTERN", message)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<AlignmentResult>),
    One(Box<AlignmentResult>),
}

/// Reads a JSON file holding either one alignment result or an array of them.
pub fn load_alignment_results(
    path: impl AsRef<Path>,
) -> Result<Vec<AlignmentResult>, InputFileError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| InputFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_alignment_results(&source).map_err(|source| InputFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_alignment_results(source: &str) -> Result<Vec<AlignmentResult>, serde_json::Error> {
    Ok(match serde_json::from_str(source)? {
        OneOrMany::Many(results) => results,
        OneOrMany::One(result) => vec![*result],
    })
}

/// Regular files directly inside `directory` whose names match `pattern`,
/// sorted by file name.
pub fn discover_alignment_inputs(
    directory: impl AsRef<Path>,
    pattern: &str,
) -> Result<Vec<PathBuf>, InputFileError> {
    let directory = directory.as_ref();
    let matcher = Glob::new(pattern)
        .map_err(|source| InputFileError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let list_error = |source| InputFileError::ListDirectory {
        path: directory.to_path_buf(),
        source,
    };
    let mut inputs = Vec::new();
    for entry in fs::read_dir(directory).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| matcher.is_match(name))
        {
            inputs.push(path);
        }
    }
    inputs.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));
    Ok(inputs)
}
