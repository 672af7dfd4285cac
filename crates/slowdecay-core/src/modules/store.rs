use super::ProfileStore;
use super::serialization::{read_json_artifact, write_json_artifact};
use crate::domain::{ProfileBatch, ProfileError, ProfileResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

pub const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
pub const ARTIFACT_SUFFIX: &str = "_profiles.json";

/// Writes one JSON artifact per batch into a fixed output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonProfileStore {
    output_dir: PathBuf,
}

impl JsonProfileStore {
    /// Creates `output_dir` if needed so that an unusable directory is
    /// reported before any batch is processed.
    pub fn create(output_dir: impl Into<PathBuf>) -> ProfileResult<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| {
            ProfileError::input_validation(
                "IO.PROFILE_OUTPUT_DIRECTORY",
                format!(
                    "failed to create profile output directory '{}': {}",
                    output_dir.display(),
                    source
                ),
            )
        })?;
        if !output_dir.is_dir() {
            return Err(ProfileError::input_validation(
                "IO.PROFILE_OUTPUT_DIRECTORY",
                format!("profile output path '{}' is not a directory", output_dir.display()),
            ));
        }
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn artifact_path(&self, batch: &ProfileBatch) -> PathBuf {
        self.output_dir
            .join(artifact_file_name(&batch.run_name, batch.created_at))
    }
}

impl ProfileStore for JsonProfileStore {
    fn persist(&self, batch: &ProfileBatch) -> ProfileResult<PathBuf> {
        let path = self.artifact_path(batch);
        write_json_artifact(&path, batch)?;
        Ok(path)
    }
}

/// `{timestamp}_{run}_profiles.json`, with the run name reduced to
/// characters that are safe in file names.
pub fn artifact_file_name(run_name: &str, created_at: DateTime<Utc>) -> String {
    let run: String = run_name
        .trim()
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '.' | '_' | '-') {
                character
            } else {
                '_'
            }
        })
        .collect();
    let run = if run.is_empty() { "run".to_string() } else { run };
    format!(
        "{}_{}{}",
        created_at.format(ARTIFACT_TIMESTAMP_FORMAT),
        run,
        ARTIFACT_SUFFIX
    )
}

pub fn load_profile_batch(path: impl AsRef<Path>) -> ProfileResult<ProfileBatch> {
    read_json_artifact(path.as_ref())
}
