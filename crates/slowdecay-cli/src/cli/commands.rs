use super::CliError;
use super::helpers::{ParameterOverrides, expand_inputs, load_inputs, resolve_parameters};
use anyhow::Context;
use slowdecay_core::modules::{
    DEFAULT_INPUT_PATTERN, OutputMode, load_profile_batch, render_profile_summary,
    run_profile_pipeline,
};
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct ProfilesArgs {
    /// Alignment result files, or directories searched with --pattern
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// File-name glob applied inside input directories
    #[arg(long, default_value = DEFAULT_INPUT_PATTERN)]
    pattern: String,

    /// JSON parameter file with azimuthRange, distanceRange and outputDir
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Azimuth window in degrees; may extend to +/-540 to straddle north
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    azimuth_range: Option<Vec<f64>>,

    /// Epicentral distance window in degrees
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    distance_range: Option<Vec<f64>>,

    /// Directory receiving one profile artifact per run
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Only persist artifacts; do not fail when no profile is built
    #[arg(long)]
    no_return: bool,
}

#[derive(clap::Args)]
pub(super) struct InspectArgs {
    /// Profile artifact written by `profiles`
    #[arg(value_name = "ARTIFACT")]
    artifact: PathBuf,

    /// Print the artifact as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

pub(super) fn run_profiles_command(args: ProfilesArgs) -> Result<i32, CliError> {
    let overrides = ParameterOverrides {
        azimuth_range: args.azimuth_range,
        distance_range: args.distance_range,
        output_dir: args.output_dir,
    };
    let parameters = resolve_parameters(args.config.as_deref(), overrides)?;
    parameters.validate()?;
    let inputs = expand_inputs(&args.inputs, &args.pattern)?;
    let results = load_inputs(&inputs)?;
    info!(
        files = inputs.len(),
        results = results.len(),
        output_dir = %parameters.output_dir.display(),
        "loaded alignment results"
    );

    let mode = if args.no_return {
        OutputMode::PersistOnly
    } else {
        OutputMode::Return
    };
    let profiles = run_profile_pipeline(&results, &parameters, mode)?;
    match mode {
        OutputMode::Return => print!("{}", render_profile_summary(&profiles)),
        OutputMode::PersistOnly => println!(
            "Profiles written to {}",
            parameters.output_dir.display()
        ),
    }
    Ok(0)
}

pub(super) fn run_inspect_command(args: InspectArgs) -> Result<i32, CliError> {
    let batch = load_profile_batch(&args.artifact)?;
    if args.json {
        let encoded = serde_json::to_string_pretty(&batch)
            .with_context(|| format!("failed to encode artifact '{}'", args.artifact.display()))?;
        println!("{}", encoded);
    } else {
        println!(
            "Artifact: {} (run {}, created {})",
            args.artifact.display(),
            batch.run_name,
            batch.created_at.to_rfc3339()
        );
        print!("{}", render_profile_summary(&batch.profiles));
    }
    Ok(0)
}
