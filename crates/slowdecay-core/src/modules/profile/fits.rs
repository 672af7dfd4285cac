use crate::domain::{ProfileError, ProfileResult};
use crate::numerics::{RegressionError, fit_line};

/// Slope of one profile regression with its standard error, if defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeEstimate {
    pub value: f64,
    pub error: Option<f64>,
}

pub fn arrival_time_variances(errors: &[f64]) -> Vec<f64> {
    errors.iter().map(|error| error * error).collect()
}

/// Natural log of each amplitude, rejecting values the logarithm is not
/// defined for.
pub fn log_amplitudes(
    amplitudes: &[f64],
    what: &str,
    station_labels: &[String],
) -> ProfileResult<Vec<f64>> {
    amplitudes
        .iter()
        .enumerate()
        .map(|(index, &amplitude)| {
            if amplitude > 0.0 && amplitude.is_finite() {
                Ok(amplitude.ln())
            } else {
                Err(ProfileError::input_validation(
                    "INPUT.NON_POSITIVE_AMPLITUDE",
                    format!(
                        "{what} of station {} must be positive, got {amplitude}",
                        station_label(station_labels, index)
                    ),
                ))
            }
        })
        .collect()
}

/// Log-domain variance `ln(A + s^2) - ln(A)` for amplitude `A` with error `s`,
/// evaluated as `ln_1p(s^2 / A)` so small errors on large amplitudes stay
/// positive.
pub fn log_amplitude_variances(amplitudes: &[f64], errors: &[f64]) -> Vec<f64> {
    amplitudes
        .iter()
        .zip(errors)
        .map(|(&amplitude, &error)| (error * error / amplitude).ln_1p())
        .collect()
}

/// Fits `values` against member `distances`. Members that all share one
/// distance leave the slope undetermined and fail as a computation error.
pub fn fit_slope(
    series: &str,
    distances: &[f64],
    values: &[f64],
    variances: &[f64],
    station_labels: &[String],
) -> ProfileResult<SlopeEstimate> {
    match fit_line(distances, values, variances) {
        Ok(fit) => Ok(SlopeEstimate {
            value: fit.slope(),
            error: fit.slope_standard_error(),
        }),
        Err(RegressionError::SingularSystem { .. }) => Err(ProfileError::computation(
            "COMPUTE.DEGENERATE_DISTANCES",
            format!(
                "{series} slope is undetermined: stations {} all lie at {} deg",
                station_labels.join(", "),
                distances.first().copied().unwrap_or_default()
            ),
        )),
        Err(RegressionError::InvalidVariance { index, value }) => {
            Err(ProfileError::input_validation(
                "INPUT.NON_POSITIVE_VARIANCE",
                format!(
                    "{series} variance of station {} must be positive and finite, got {value}",
                    station_label(station_labels, index)
                ),
            ))
        }
        Err(RegressionError::NonFiniteObservation { index }) => {
            Err(ProfileError::input_validation(
                "INPUT.NON_FINITE_OBSERVATION",
                format!(
                    "{series} observation of station {} is not finite",
                    station_label(station_labels, index)
                ),
            ))
        }
        Err(other) => Err(ProfileError::internal(
            "SYS.REGRESSION",
            format!("{series} regression failed: {other}"),
        )),
    }
}

fn station_label(labels: &[String], index: usize) -> &str {
    labels.get(index).map_or("?", String::as_str)
}

#[cfg(test)]
mod tests {
    use super::{arrival_time_variances, fit_slope, log_amplitude_variances, log_amplitudes};
    use crate::domain::ProfileErrorCategory;

    fn labels(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("XX.S{index}..BHZ")).collect()
    }

    #[test]
    fn log_amplitude_variance_uses_the_asymmetric_transform() {
        let variances = log_amplitude_variances(&[2.0, 0.5], &[1.0, 0.5]);
        assert!((variances[0] - (3.0_f64.ln() - 2.0_f64.ln())).abs() < 1.0e-14);
        assert!((variances[1] - (0.75_f64.ln() - 0.5_f64.ln())).abs() < 1.0e-14);
        assert_eq!(arrival_time_variances(&[0.5, -2.0]), vec![0.25, 4.0]);
    }

    #[test]
    fn tiny_errors_on_large_amplitudes_keep_a_positive_variance() {
        let amplitudes = [16500.0, 13500.0, 11100.0, 9070.0];
        let variances = log_amplitude_variances(&amplitudes, &[1.0e-6; 4]);
        for (variance, amplitude) in variances.iter().zip(amplitudes) {
            assert!(*variance > 0.0, "variance for {amplitude} collapsed to {variance}");
            let expected = 1.0e-12 / amplitude;
            assert!((variance - expected).abs() <= expected * 1.0e-9);
        }

        let fit = fit_slope(
            "log amplitude",
            &[90.0, 100.0, 110.0, 120.0],
            &amplitudes.map(f64::ln),
            &variances,
            &labels(4),
        )
        .expect("high signal-to-noise amplitudes should fit");
        assert!(fit.value < 0.0);
    }

    #[test]
    fn non_positive_amplitudes_are_rejected_with_the_station_name() {
        let error = log_amplitudes(&[1.0, 0.0], "amplitude", &labels(2)).expect_err("zero");
        assert_eq!(error.category(), ProfileErrorCategory::InputValidationError);
        assert_eq!(error.code(), "INPUT.NON_POSITIVE_AMPLITUDE");
        assert!(error.message().contains("XX.S1..BHZ"));

        assert!(log_amplitudes(&[-3.0], "amplitude", &labels(1)).is_err());
        let logs =
            log_amplitudes(&[1.0, std::f64::consts::E], "amplitude", &labels(2)).expect("logs");
        assert!((logs[1] - 1.0).abs() < 1.0e-15);
    }

    #[test]
    fn slopes_carry_standard_errors_only_with_residual_freedom() {
        let two = fit_slope("time", &[90.0, 100.0], &[0.0, 46.0], &[1.0, 1.0], &labels(2))
            .expect("two distinct distances should fit");
        assert!((two.value - 4.6).abs() < 1.0e-9);
        assert_eq!(two.error, None);

        let three = fit_slope(
            "time",
            &[90.0, 100.0, 110.0],
            &[0.0, 46.0, 93.0],
            &[1.0, 1.0, 1.0],
            &labels(3),
        )
        .expect("three distinct distances should fit");
        assert!(three.error.is_some_and(|error| error > 0.0));
    }

    #[test]
    fn identical_distances_are_computation_errors() {
        let error = fit_slope(
            "time",
            &[100.0, 100.0, 100.0],
            &[1.0, 2.0, 3.0],
            &[1.0; 3],
            &labels(3),
        )
        .expect_err("slope is undetermined");
        assert_eq!(error.category(), ProfileErrorCategory::ComputationError);
        assert_eq!(error.code(), "COMPUTE.DEGENERATE_DISTANCES");
        assert_eq!(error.exit_code(), 5);
        assert!(error.message().contains("XX.S2..BHZ"));
    }

    #[test]
    fn zero_variances_are_input_errors() {
        let error = fit_slope("time", &[90.0, 100.0], &[0.0, 1.0], &[1.0, 0.0], &labels(2))
            .expect_err("zero variance");
        assert_eq!(error.code(), "INPUT.NON_POSITIVE_VARIANCE");
        assert!(error.message().contains("XX.S1..BHZ"));
    }
}
