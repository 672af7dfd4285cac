use super::CliError;
use slowdecay_core::common::config::{ProfileParameters, load_profile_parameters};
use slowdecay_core::domain::{AlignmentResult, ProfileError};
use slowdecay_core::modules::{discover_alignment_inputs, load_alignment_results};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Command-line values that take precedence over the parameter file.
#[derive(Debug, Clone, Default)]
pub(super) struct ParameterOverrides {
    pub(super) azimuth_range: Option<Vec<f64>>,
    pub(super) distance_range: Option<Vec<f64>>,
    pub(super) output_dir: Option<PathBuf>,
}

pub(super) fn resolve_parameters(
    config: Option<&Path>,
    overrides: ParameterOverrides,
) -> Result<ProfileParameters, CliError> {
    let mut parameters = match config {
        Some(path) => load_profile_parameters(path).map_err(ProfileError::from)?,
        None => ProfileParameters::default(),
    };
    if let Some(range) = overrides.azimuth_range {
        parameters.azimuth_range = range;
    }
    if let Some(range) = overrides.distance_range {
        parameters.distance_range = range;
    }
    if let Some(output_dir) = overrides.output_dir {
        parameters.output_dir = output_dir;
    }
    Ok(parameters)
}

/// Replaces each directory with its matching files; files are kept as given.
pub(super) fn expand_inputs(inputs: &[PathBuf], pattern: &str) -> Result<Vec<PathBuf>, CliError> {
    let mut expanded = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let discovered = discover_alignment_inputs(input, pattern).map_err(ProfileError::from)?;
            if discovered.is_empty() {
                warn!(directory = %input.display(), pattern, "no alignment inputs matched");
            }
            expanded.extend(discovered);
        } else if input.is_file() {
            expanded.push(input.clone());
        } else {
            return Err(ProfileError::input_validation(
                "INPUT.CLI_INPUT",
                format!("input '{}' does not exist", input.display()),
            )
            .into());
        }
    }

    if expanded.is_empty() {
        return Err(ProfileError::input_validation(
            "INPUT.CLI_INPUT",
            format!("no alignment inputs matched pattern '{pattern}'"),
        )
        .into());
    }
    Ok(expanded)
}

pub(super) fn load_inputs(paths: &[PathBuf]) -> Result<Vec<AlignmentResult>, CliError> {
    let mut results = Vec::new();
    for path in paths {
        let loaded = load_alignment_results(path).map_err(ProfileError::from)?;
        debug!(path = %path.display(), results = loaded.len(), "read alignment input");
        results.extend(loaded);
    }
    Ok(results)
}
