pub mod errors;

pub use errors::{ProfileError, ProfileErrorCategory, ProfileResult};

use crate::modules::corrections::{CorrectionKind, CorrectionNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Smallest number of stations a profile can be regressed over.
pub const MIN_PROFILE_STATIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationIdentity {
    pub network: String,
    pub station: String,
    #[serde(default)]
    pub stream: String,
    pub component: String,
}

impl Display for StationIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.stream, self.component
        )
    }
}

/// Great-circle geometry of a station relative to the event, in degrees
/// (`distance_km` in kilometres).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationGeometry {
    pub distance: f64,
    pub azimuth: f64,
    pub back_azimuth: f64,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    pub identity: StationIdentity,
    pub location: Location,
    pub geometry: StationGeometry,
}

/// Per-station alignment outputs, parallel to `AlignmentResult::stations`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentSolution {
    pub arrival_times: Vec<f64>,
    pub arrival_time_errors: Vec<f64>,
    pub amplitudes: Vec<f64>,
    pub amplitude_errors: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAssignment {
    pub cluster_ids: Vec<u32>,
    #[serde(default)]
    pub good_clusters: BTreeSet<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterBand {
    pub low_hz: f64,
    pub high_hz: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Phase {
    Pdiff,
    SHdiff,
    SVdiff,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdiff => "Pdiff",
            Self::SHdiff => "SHdiff",
            Self::SVdiff => "SVdiff",
        }
    }

    /// Mantle upswing table matching the wave type of the phase.
    pub const fn mantle_upswing(self) -> CorrectionKind {
        match self {
            Self::Pdiff => CorrectionKind::MantleUpswingP,
            Self::SHdiff | Self::SVdiff => CorrectionKind::MantleUpswingS,
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for Phase {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Pdiff" => Ok(Self::Pdiff),
            "SHdiff" => Ok(Self::SHdiff),
            "SVdiff" => Ok(Self::SVdiff),
            other => Err(ProfileError::input_validation(
                "INPUT.UNSUPPORTED_PHASE",
                format!("unsupported phase '{other}'; expected one of Pdiff, SHdiff, SVdiff"),
            )),
        }
    }
}

/// Reference frame the corrected regression outputs of a profile live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum EarthFrame {
    #[serde(rename = "1D")]
    OneDimensional,
    #[serde(rename = "3D")]
    ThreeDimensional,
}

impl EarthFrame {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneDimensional => "1D",
            Self::ThreeDimensional => "3D",
        }
    }
}

/// Output of one alignment/clustering run over a single event.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentResult {
    pub run_name: String,
    #[serde(default)]
    pub source_directory: String,
    pub earth_model: String,
    pub phase: String,
    pub filter_band: FilterBand,
    #[serde(default)]
    pub is_synthetic: bool,
    pub stations: Vec<StationRecord>,
    /// Event location as recorded with each station, parallel to `stations`.
    pub events: Vec<Location>,
    #[serde(default)]
    pub solution: Option<AlignmentSolution>,
    pub clusters: ClusterAssignment,
    pub outliers: Vec<bool>,
    pub correlation_matrix: Vec<Vec<f64>>,
    #[serde(default)]
    pub corrections: CorrectionNode,
}

impl AlignmentResult {
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn phase(&self) -> ProfileResult<Phase> {
        self.phase.parse()
    }

    /// The single event shared by every station of the run.
    pub fn event(&self) -> ProfileResult<Location> {
        let mut distinct: Vec<Location> = Vec::new();
        for event in &self.events {
            if !distinct.contains(event) {
                distinct.push(*event);
            }
        }

        match distinct.as_slice() {
            [event] => Ok(*event),
            [] => Err(ProfileError::input_validation(
                "INPUT.INCONSISTENT_EVENT",
                format!("run '{}' does not record an event location", self.run_name),
            )),
            many => Err(ProfileError::input_validation(
                "INPUT.INCONSISTENT_EVENT",
                format!(
                    "run '{}' has {} distinct event locations; expected exactly one",
                    self.run_name,
                    many.len()
                ),
            )),
        }
    }

    /// Checks that every per-station array is parallel to `stations`, that
    /// the event is unique and that the phase is supported.
    pub fn validate(&self) -> ProfileResult<()> {
        let station_count = self.station_count();
        self.phase()?;
        self.event()?;

        self.require_parallel("events", self.events.len())?;
        self.require_parallel("clusters.clusterIds", self.clusters.cluster_ids.len())?;
        self.require_parallel("outliers", self.outliers.len())?;
        self.require_parallel("correlationMatrix", self.correlation_matrix.len())?;
        for (row_index, row) in self.correlation_matrix.iter().enumerate() {
            if row.len() != station_count {
                return Err(ProfileError::input_validation(
                    "INPUT.CORRELATION_MATRIX_SHAPE",
                    format!(
                        "run '{}' correlation matrix row {} has {} entries; expected {}",
                        self.run_name,
                        row_index,
                        row.len(),
                        station_count
                    ),
                ));
            }
        }

        if let Some(solution) = &self.solution {
            self.require_parallel("solution.arrivalTimes", solution.arrival_times.len())?;
            self.require_parallel(
                "solution.arrivalTimeErrors",
                solution.arrival_time_errors.len(),
            )?;
            self.require_parallel("solution.amplitudes", solution.amplitudes.len())?;
            self.require_parallel("solution.amplitudeErrors", solution.amplitude_errors.len())?;
        }

        self.corrections.validate_lengths(station_count)
    }

    fn require_parallel(&self, field: &str, length: usize) -> ProfileResult<()> {
        if length == self.station_count() {
            return Ok(());
        }
        Err(ProfileError::input_validation(
            "INPUT.STATION_ARRAY_LENGTH",
            format!(
                "run '{}' field '{}' has {} entries but the run has {} stations",
                self.run_name,
                field,
                length,
                self.station_count()
            ),
        ))
    }
}

/// Regression estimates and station subset for one accepted cluster.
///
/// The `corrected_*` outputs are 1D-equivalent for observed data and
/// 3D-equivalent for synthetics; see [`Profile::corrected_frame`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub run_name: String,
    pub source_directory: String,
    pub earth_model: String,
    pub phase: Phase,
    pub filter_band: FilterBand,
    pub is_synthetic: bool,
    pub creation_timestamp: DateTime<Utc>,
    pub cluster_id: u32,
    pub distance_span: f64,
    pub azimuth_span: f64,
    pub slowness: f64,
    pub slowness_error: Option<f64>,
    pub decay_rate: f64,
    pub decay_rate_error: Option<f64>,
    pub corrected_slowness: f64,
    pub corrected_slowness_error: Option<f64>,
    pub corrected_decay_rate: f64,
    pub corrected_decay_rate_error: Option<f64>,
    /// Indices of the members within the source run's station list.
    pub station_indices: Vec<usize>,
    pub member_stations: Vec<StationRecord>,
    pub event_location: Location,
    pub corrections: CorrectionNode,
    /// Upper-triangle correlations ordered `(0,1), (0,2), .., (1,2), ..` over
    /// `member_stations`.
    pub correlation_coefficients: Vec<f64>,
}

impl Profile {
    pub fn station_count(&self) -> usize {
        self.member_stations.len()
    }

    pub const fn corrected_frame(&self) -> EarthFrame {
        if self.is_synthetic {
            EarthFrame::ThreeDimensional
        } else {
            EarthFrame::OneDimensional
        }
    }
}

/// Profiles built from one alignment run, persisted together as one artifact.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBatch {
    pub run_name: String,
    pub created_at: DateTime<Utc>,
    pub profiles: Vec<Profile>,
}

impl ProfileBatch {
    pub fn new(
        run_name: impl Into<String>,
        created_at: DateTime<Utc>,
        profiles: Vec<Profile>,
    ) -> Self {
        Self {
            run_name: run_name.into(),
            created_at,
            profiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EarthFrame, Location, Phase};
    use crate::domain::ProfileErrorCategory;
    use crate::modules::corrections::CorrectionKind;

    #[test]
    fn phase_parsing_accepts_core_diffracted_phases_only() {
        assert_eq!("Pdiff".parse::<Phase>().expect("Pdiff"), Phase::Pdiff);
        assert_eq!(" SHdiff ".parse::<Phase>().expect("SHdiff"), Phase::SHdiff);
        assert_eq!("SVdiff".parse::<Phase>().expect("SVdiff"), Phase::SVdiff);

        let error = "PKP".parse::<Phase>().expect_err("PKP is not core-diffracted");
        assert_eq!(error.category(), ProfileErrorCategory::InputValidationError);
        assert_eq!(error.code(), "INPUT.UNSUPPORTED_PHASE");
        assert!(error.message().contains("PKP"));
    }

    #[test]
    fn shear_phases_share_the_s_model_upswing_table() {
        assert_eq!(Phase::Pdiff.mantle_upswing(), CorrectionKind::MantleUpswingP);
        assert_eq!(Phase::SHdiff.mantle_upswing(), CorrectionKind::MantleUpswingS);
        assert_eq!(Phase::SVdiff.mantle_upswing(), CorrectionKind::MantleUpswingS);
    }

    #[test]
    fn earth_frame_serializes_as_short_label() {
        let encoded = serde_json::to_string(&EarthFrame::OneDimensional).expect("encode");
        assert_eq!(encoded, "\"1D\"");
        assert_eq!(EarthFrame::ThreeDimensional.label(), "3D");
    }

    #[test]
    fn location_uses_camel_case_fields() {
        let location: Location = serde_json::from_str(
            r#"{"latitude": 1.5, "longitude": -2.0, "elevation": 0.0, "depth": 600.0}"#,
        )
        .expect("location should parse");
        assert_eq!(location.depth, 600.0);
    }
}
