pub mod regression;

pub use regression::{RegressionError, WeightedFit, fit_line, weighted_least_squares};

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

/// `max - min` over `values`, or `None` for an empty slice.
pub fn value_span(values: &[f64]) -> Option<f64> {
    let (first, rest) = values.split_first()?;
    let (min, max) = rest
        .iter()
        .fold((*first, *first), |(min, max), &value| (min.min(value), max.max(value)));
    Some(max - min)
}
