use super::azimuth::{AZIMUTH_LIMIT_DEGREES, normalize_azimuth};
use crate::domain::{AlignmentResult, ProfileError, ProfileResult};

/// Inclusive `[min, max]` interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeWindow {
    pub min: f64,
    pub max: f64,
}

impl RangeWindow {
    /// Builds a window from a user-supplied pair, rejecting anything other
    /// than two finite, ordered values (and magnitudes above `limit`, if set).
    pub fn from_values(name: &str, values: &[f64], limit: Option<f64>) -> ProfileResult<Self> {
        let code = range_error_code(name);
        let [min, max] = values else {
            return Err(ProfileError::input_validation(
                code,
                format!(
                    "{name} range must contain exactly two values, got {}",
                    values.len()
                ),
            ));
        };
        let (min, max) = (*min, *max);

        if !(min.is_finite() && max.is_finite()) {
            return Err(ProfileError::input_validation(
                code,
                format!("{name} range [{min}, {max}] must contain finite values"),
            ));
        }
        if let Some(limit) = limit {
            if min.abs() > limit || max.abs() > limit {
                return Err(ProfileError::input_validation(
                    code,
                    format!("{name} range [{min}, {max}] exceeds +/-{limit}"),
                ));
            }
        }
        if min > max {
            return Err(ProfileError::input_validation(
                code,
                format!("{name} range [{min}, {max}] has its minimum above its maximum"),
            ));
        }

        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

fn range_error_code(name: &str) -> &'static str {
    match name {
        "azimuth" => "INPUT.AZIMUTH_RANGE",
        "distance" => "INPUT.DISTANCE_RANGE",
        _ => "INPUT.RANGE",
    }
}

/// Validated azimuth and distance limits applied to every station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionWindow {
    pub azimuth: RangeWindow,
    pub distance: RangeWindow,
}

impl SelectionWindow {
    pub fn new(azimuth_range: &[f64], distance_range: &[f64]) -> ProfileResult<Self> {
        Ok(Self {
            azimuth: RangeWindow::from_values(
                "azimuth",
                azimuth_range,
                Some(AZIMUTH_LIMIT_DEGREES),
            )?,
            distance: RangeWindow::from_values("distance", distance_range, None)?,
        })
    }
}

impl Default for SelectionWindow {
    fn default() -> Self {
        Self {
            azimuth: RangeWindow { min: 0.0, max: 360.0 },
            distance: RangeWindow { min: 0.0, max: 180.0 },
        }
    }
}

/// Picks the stations of a run that belong to a cluster profile.
#[derive(Debug, Clone)]
pub struct StationSelector<'a> {
    window: SelectionWindow,
    result: &'a AlignmentResult,
    azimuths: Vec<f64>,
}

impl<'a> StationSelector<'a> {
    pub fn new(window: SelectionWindow, result: &'a AlignmentResult) -> Self {
        let azimuths = result
            .stations
            .iter()
            .map(|station| normalize_azimuth(station.geometry.azimuth, window.azimuth.max))
            .collect();
        Self {
            window,
            result,
            azimuths,
        }
    }

    /// Station azimuth wrapped against the window maximum.
    pub fn normalized_azimuth(&self, index: usize) -> f64 {
        self.azimuths[index]
    }

    /// Accepted clusters in ascending id order.
    pub fn candidate_clusters(&self) -> impl Iterator<Item = u32> + '_ {
        self.result.clusters.good_clusters.iter().copied()
    }

    pub fn accepts(&self, index: usize, cluster_id: u32) -> bool {
        let Some(station) = self.result.stations.get(index) else {
            return false;
        };
        self.result.clusters.cluster_ids.get(index) == Some(&cluster_id)
            && self.result.outliers.get(index) == Some(&false)
            && self.window.distance.contains(station.geometry.distance)
            && self.window.azimuth.contains(self.azimuths[index])
    }

    /// Filters `candidates` down to the members of `cluster_id`, keeping
    /// their order. Clusters outside the accepted set select nothing.
    pub fn select<I>(&self, cluster_id: u32, candidates: I) -> Vec<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        if !self.result.clusters.good_clusters.contains(&cluster_id) {
            return Vec::new();
        }
        candidates
            .into_iter()
            .filter(|&index| self.accepts(index, cluster_id))
            .collect()
    }

    pub fn select_cluster(&self, cluster_id: u32) -> Vec<usize> {
        self.select(cluster_id, 0..self.result.station_count())
    }
}
