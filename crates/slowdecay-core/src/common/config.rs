//! Run parameters for profile extraction.
//!
//! Parameters come from an optional JSON file (`azimuthRange`,
//! `distanceRange`, `outputDir`) and are validated into a
//! [`SelectionWindow`] before any alignment result is touched.

use crate::domain::{ProfileError, ProfileResult};
use crate::modules::selection::SelectionWindow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_AZIMUTH_RANGE: [f64; 2] = [0.0, 360.0];
pub const DEFAULT_DISTANCE_RANGE: [f64; 2] = [0.0, 180.0];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileParameters {
    pub azimuth_range: Vec<f64>,
    pub distance_range: Vec<f64>,
    pub output_dir: PathBuf,
}

impl Default for ProfileParameters {
    fn default() -> Self {
        Self {
            azimuth_range: DEFAULT_AZIMUTH_RANGE.to_vec(),
            distance_range: DEFAULT_DISTANCE_RANGE.to_vec(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ProfileParameters {
    /// Checks both ranges: two finite values each, ordered, azimuths within
    /// +/-540 degrees.
    pub fn validate(&self) -> ProfileResult<SelectionWindow> {
        SelectionWindow::new(&self.azimuth_range, &self.distance_range)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParameterFileError {
    #[error("failed to read profile parameters '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse profile parameters '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<ParameterFileError> for ProfileError {
    fn from(error: ParameterFileError) -> Self {
        let message = error.to_string();
        match error {
            ParameterFileError::Read { .. } => {
                ProfileError::io_system("IO.PARAMETER_READ", message)
            }
            ParameterFileError::Parse { .. } => {
                ProfileError::input_validation("INPUT.PARAMETER_PARSE", message)
            }
        }
    }
}

pub fn load_profile_parameters(
    path: impl AsRef<Path>,
) -> Result<ProfileParameters, ParameterFileError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ParameterFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ParameterFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
