//! Travel-time and amplitude corrections for laterally heterogeneous structure.
//!
//! Observed waveforms already carry the 3D structure, so their corrections are
//! subtracted to obtain 1D-equivalent values. Synthetics are computed in a 1D
//! model, so the same corrections are added to emulate 3D observations.

mod tree;

pub use tree::{CorrectionKind, CorrectionNode};

use crate::domain::{EarthFrame, Phase, ProfileError, ProfileResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionDirection {
    /// Synthetic (1D) values projected into the 3D frame.
    AddCorrections,
    /// Observed (3D) values reduced to the 1D frame.
    SubtractCorrections,
}

impl ProjectionDirection {
    pub const fn for_run(is_synthetic: bool) -> Self {
        if is_synthetic {
            Self::AddCorrections
        } else {
            Self::SubtractCorrections
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            Self::AddCorrections => Self::SubtractCorrections,
            Self::SubtractCorrections => Self::AddCorrections,
        }
    }

    pub const fn sign(self) -> f64 {
        match self {
            Self::AddCorrections => 1.0,
            Self::SubtractCorrections => -1.0,
        }
    }

    /// Frame of the values after projection.
    pub const fn target_frame(self) -> EarthFrame {
        match self {
            Self::AddCorrections => EarthFrame::ThreeDimensional,
            Self::SubtractCorrections => EarthFrame::OneDimensional,
        }
    }
}

/// Corrected amplitudes with their scaled one-sigma errors.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedAmplitudes {
    pub amplitudes: Vec<f64>,
    pub errors: Vec<f64>,
}

/// Applies the corrections of one station set to its arrival times and
/// amplitudes. All slices handed to a projector must be parallel to the
/// correction leaves it was built from.
#[derive(Debug, Clone)]
pub struct CorrectionProjector<'a> {
    direction: ProjectionDirection,
    ellipticity: &'a [f64],
    crustal: &'a [f64],
    mantle_upswing: &'a [f64],
    geometric_spreading: &'a [f64],
}

impl<'a> CorrectionProjector<'a> {
    pub fn new(
        corrections: &'a CorrectionNode,
        phase: Phase,
        is_synthetic: bool,
    ) -> ProfileResult<Self> {
        Self::with_direction(corrections, phase, ProjectionDirection::for_run(is_synthetic))
    }

    pub fn with_direction(
        corrections: &'a CorrectionNode,
        phase: Phase,
        direction: ProjectionDirection,
    ) -> ProfileResult<Self> {
        let ellipticity = corrections.correction(CorrectionKind::Ellipticity)?;
        let crustal = corrections.correction(CorrectionKind::Crustal)?;
        let mantle_upswing = corrections.correction(phase.mantle_upswing())?;
        let geometric_spreading = corrections.correction(CorrectionKind::GeometricSpreading)?;

        let station_count = ellipticity.len();
        for (kind, values) in [
            (CorrectionKind::Crustal, crustal),
            (phase.mantle_upswing(), mantle_upswing),
            (CorrectionKind::GeometricSpreading, geometric_spreading),
        ] {
            if values.len() != station_count {
                return Err(ProfileError::input_validation(
                    "INPUT.CORRECTION_LENGTH",
                    format!(
                        "correction '{}' has {} values but '{}' has {}",
                        kind.label(),
                        values.len(),
                        CorrectionKind::Ellipticity.label(),
                        station_count
                    ),
                ));
            }
        }

        Ok(Self {
            direction,
            ellipticity,
            crustal,
            mantle_upswing,
            geometric_spreading,
        })
    }

    pub const fn direction(&self) -> ProjectionDirection {
        self.direction
    }

    pub fn reversed(&self) -> Self {
        Self {
            direction: self.direction.reversed(),
            ..self.clone()
        }
    }

    pub fn station_count(&self) -> usize {
        self.ellipticity.len()
    }

    /// Sum of the travel-time terms for each station.
    pub fn total_travel_time_correction(&self) -> Vec<f64> {
        self.ellipticity
            .iter()
            .zip(self.crustal)
            .zip(self.mantle_upswing)
            .map(|((ellipticity, crustal), upswing)| ellipticity + crustal + upswing)
            .collect()
    }

    pub fn project_arrival_times(&self, arrival_times: &[f64]) -> ProfileResult<Vec<f64>> {
        self.require_parallel("arrival times", arrival_times.len())?;
        let sign = self.direction.sign();
        Ok(arrival_times
            .iter()
            .zip(self.total_travel_time_correction())
            .map(|(time, correction)| time + sign * correction)
            .collect())
    }

    /// Divides amplitudes and their errors by the geometric-spreading term.
    /// The division does not depend on the projection direction.
    pub fn project_amplitudes(
        &self,
        amplitudes: &[f64],
        errors: &[f64],
    ) -> ProfileResult<CorrectedAmplitudes> {
        self.require_parallel("amplitudes", amplitudes.len())?;
        self.require_parallel("amplitude errors", errors.len())?;

        let mut corrected = CorrectedAmplitudes {
            amplitudes: Vec::with_capacity(amplitudes.len()),
            errors: Vec::with_capacity(errors.len()),
        };
        for (index, ((&amplitude, &error), &spreading)) in amplitudes
            .iter()
            .zip(errors)
            .zip(self.geometric_spreading)
            .enumerate()
        {
            if spreading == 0.0 || !spreading.is_finite() {
                return Err(ProfileError::input_validation(
                    "INPUT.GEOMETRIC_SPREADING",
                    format!(
                        "geometric spreading correction at station {index} \
                         must be finite and non-zero, got {spreading}"
                    ),
                ));
            }
            corrected.amplitudes.push(amplitude / spreading);
            corrected.errors.push(error / spreading.abs());
        }
        Ok(corrected)
    }

    fn require_parallel(&self, what: &str, length: usize) -> ProfileResult<()> {
        if length == self.station_count() {
            return Ok(());
        }
        Err(ProfileError::internal(
            "SYS.CORRECTION_LENGTH",
            format!(
                "{} has {} values but corrections cover {} stations",
                what,
                length,
                self.station_count()
            ),
        ))
    }
}
