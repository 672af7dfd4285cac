mod fits;

use super::ProfileStore;
use super::corrections::{CorrectionKind, CorrectionProjector};
use super::correlation::member_correlations;
use super::selection::{SelectionWindow, StationSelector};
use super::store::JsonProfileStore;
use crate::common::config::ProfileParameters;
use crate::domain::{
    AlignmentResult, AlignmentSolution, Location, MIN_PROFILE_STATIONS, Phase, Profile,
    ProfileBatch, ProfileError, ProfileResult,
};
use crate::numerics::value_span;
use chrono::{DateTime, Utc};
use fits::{arrival_time_variances, fit_slope, log_amplitude_variances, log_amplitudes};
use tracing::{debug, info};

pub type Clock = fn() -> DateTime<Utc>;

/// Whether the caller wants the built profiles back or only on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Return every profile; building none at all is an error.
    Return,
    PersistOnly,
}

/// Builds cluster profiles from alignment results and hands each run's
/// profiles to a [`ProfileStore`] as one batch.
#[derive(Debug, Clone)]
pub struct ProfileBuilder<S> {
    window: SelectionWindow,
    store: S,
    clock: Clock,
}

impl<S: ProfileStore> ProfileBuilder<S> {
    pub fn new(window: SelectionWindow, store: S) -> Self {
        Self {
            window,
            store,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Processes `results` in order, persisting one batch per result that
    /// yields profiles. Every result is validated before the first
    /// regression or write.
    pub fn run(
        &self,
        results: &[AlignmentResult],
        mode: OutputMode,
    ) -> ProfileResult<Vec<Profile>> {
        for result in results {
            validate_for_profiles(result)?;
        }

        let mut returned = Vec::new();
        let mut produced = 0usize;
        for result in results {
            let Some(batch) = self.build_batch(result)? else {
                continue;
            };
            let artifact = self.store.persist(&batch)?;
            info!(
                run = %batch.run_name,
                stations = result.station_count(),
                profiles = batch.profiles.len(),
                artifact = %artifact.display(),
                "persisted profile batch"
            );
            produced += batch.profiles.len();
            if mode == OutputMode::Return {
                returned.extend(batch.profiles);
            }
        }

        if mode == OutputMode::Return && produced == 0 {
            return Err(ProfileError::insufficient_data(
                "DATA.INSUFFICIENT",
                format!(
                    "no profiles could be built from {} alignment result(s) \
                     with {} stations per profile at minimum",
                    results.len(),
                    MIN_PROFILE_STATIONS
                ),
            ));
        }
        Ok(returned)
    }

    /// Profiles of one result, or `None` when it has no solution or no
    /// cluster yields a profile.
    pub fn build_batch(&self, result: &AlignmentResult) -> ProfileResult<Option<ProfileBatch>> {
        let Some(solution) = &result.solution else {
            debug!(run = %result.run_name, "skipping run without an alignment solution");
            return Ok(None);
        };
        let created_at = (self.clock)();
        let context = RunContext {
            result,
            solution,
            phase: result.phase()?,
            event: result.event()?,
            selector: StationSelector::new(self.window, result),
            created_at,
        };

        let mut profiles = Vec::new();
        for cluster_id in context.selector.candidate_clusters() {
            let members = context.selector.select_cluster(cluster_id);
            if members.len() < MIN_PROFILE_STATIONS {
                debug!(
                    run = %result.run_name,
                    cluster = cluster_id,
                    members = members.len(),
                    "cluster has too few qualifying stations"
                );
                continue;
            }
            let profile = context.build_profile(cluster_id, members)?;
            debug!(
                run = %result.run_name,
                cluster = cluster_id,
                members = profile.station_count(),
                slowness = profile.slowness,
                "built profile"
            );
            profiles.push(profile);
        }

        if profiles.is_empty() {
            debug!(run = %result.run_name, "run produced no profiles");
            return Ok(None);
        }
        Ok(Some(ProfileBatch::new(result.run_name.clone(), created_at, profiles)))
    }
}

/// Validates `parameters`, prepares the output directory and runs the
/// builder over `results` with a [`JsonProfileStore`].
pub fn run_profile_pipeline(
    results: &[AlignmentResult],
    parameters: &ProfileParameters,
    mode: OutputMode,
) -> ProfileResult<Vec<Profile>> {
    let window = parameters.validate()?;
    let store = JsonProfileStore::create(&parameters.output_dir)?;
    ProfileBuilder::new(window, store).run(results, mode)
}

/// Structural checks plus, for results that will be regressed, presence of
/// every correction the phase needs.
fn validate_for_profiles(result: &AlignmentResult) -> ProfileResult<()> {
    result.validate()?;
    if result.solution.is_none() {
        return Ok(());
    }
    let phase = result.phase()?;
    for kind in [
        CorrectionKind::Ellipticity,
        CorrectionKind::Crustal,
        phase.mantle_upswing(),
        CorrectionKind::GeometricSpreading,
    ] {
        result.corrections.correction(kind).map_err(|error| {
            ProfileError::input_validation(
                error.code(),
                format!("run '{}': {}", result.run_name, error.message()),
            )
        })?;
    }
    Ok(())
}

struct RunContext<'a> {
    result: &'a AlignmentResult,
    solution: &'a AlignmentSolution,
    phase: Phase,
    event: Location,
    selector: StationSelector<'a>,
    created_at: DateTime<Utc>,
}

impl RunContext<'_> {
    fn build_profile(&self, cluster_id: u32, members: Vec<usize>) -> ProfileResult<Profile> {
        let result = self.result;
        let solution = self.solution;
        let pick =
            |values: &[f64]| -> Vec<f64> { members.iter().map(|&index| values[index]).collect() };

        let member_stations: Vec<_> = members
            .iter()
            .map(|&index| result.stations[index].clone())
            .collect();
        let labels: Vec<String> = member_stations
            .iter()
            .map(|station| station.identity.to_string())
            .collect();
        let distances: Vec<f64> = member_stations
            .iter()
            .map(|station| station.geometry.distance)
            .collect();
        let azimuths: Vec<f64> = members
            .iter()
            .map(|&index| self.selector.normalized_azimuth(index))
            .collect();

        let arrival_times = pick(&solution.arrival_times);
        let arrival_time_errors = pick(&solution.arrival_time_errors);
        let amplitudes = pick(&solution.amplitudes);
        let amplitude_errors = pick(&solution.amplitude_errors);
        let log_raw = log_amplitudes(&amplitudes, "amplitude", &labels)?;

        let corrections = result.corrections.subset(&members, result.station_count())?;
        let projector = CorrectionProjector::new(&corrections, self.phase, result.is_synthetic)?;
        let corrected_times = projector.project_arrival_times(&arrival_times)?;
        let corrected = projector.project_amplitudes(&amplitudes, &amplitude_errors)?;
        let log_corrected = log_amplitudes(&corrected.amplitudes, "corrected amplitude", &labels)?;

        let time_variances = arrival_time_variances(&arrival_time_errors);
        let slowness = fit_slope(
            "arrival time",
            &distances,
            &arrival_times,
            &time_variances,
            &labels,
        )?;
        let corrected_slowness = fit_slope(
            "corrected arrival time",
            &distances,
            &corrected_times,
            &time_variances,
            &labels,
        )?;
        let decay = fit_slope(
            "log amplitude",
            &distances,
            &log_raw,
            &log_amplitude_variances(&amplitudes, &amplitude_errors),
            &labels,
        )?;
        let corrected_decay = fit_slope(
            "corrected log amplitude",
            &distances,
            &log_corrected,
            &log_amplitude_variances(&corrected.amplitudes, &corrected.errors),
            &labels,
        )?;

        let correlation_coefficients = member_correlations(&result.correlation_matrix, &members)?;

        Ok(Profile {
            run_name: result.run_name.clone(),
            source_directory: result.source_directory.clone(),
            earth_model: result.earth_model.clone(),
            phase: self.phase,
            filter_band: result.filter_band,
            is_synthetic: result.is_synthetic,
            creation_timestamp: self.created_at,
            cluster_id,
            distance_span: value_span(&distances).unwrap_or_default(),
            azimuth_span: value_span(&azimuths).unwrap_or_default(),
            slowness: slowness.value,
            slowness_error: slowness.error,
            decay_rate: decay.value,
            decay_rate_error: decay.error,
            corrected_slowness: corrected_slowness.value,
            corrected_slowness_error: corrected_slowness.error,
            corrected_decay_rate: corrected_decay.value,
            corrected_decay_rate_error: corrected_decay.error,
            station_indices: members,
            member_stations,
            event_location: self.event,
            corrections,
            correlation_coefficients,
        })
    }
}
