use super::stable_sum;
use faer::Mat;

pub type DenseMatrix = Mat<f64>;

const RELATIVE_PIVOT_EPSILON: f64 = 1.0e-12;
const LINE_PARAMETER_COUNT: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegressionError {
    #[error("design matrix has {rows} rows but {observations} observations were supplied")]
    ObservationCountMismatch { rows: usize, observations: usize },
    #[error("expected {observations} variances, got {variances}")]
    VarianceCountMismatch { observations: usize, variances: usize },
    #[error("{parameters} parameters need at least {parameters} observations, got {observations}")]
    TooFewObservations { parameters: usize, observations: usize },
    #[error("observation {index} is not finite")]
    NonFiniteObservation { index: usize },
    #[error("variance of observation {index} must be positive and finite, got {value}")]
    InvalidVariance { index: usize, value: f64 },
    #[error("normal matrix is singular at pivot index {pivot_index}")]
    SingularSystem { pivot_index: usize },
}

/// Weighted least-squares solution.
///
/// The covariance is the residual-scaled inverse normal matrix
/// `mse * (X^T W X)^-1`, so a noiseless fit has zero covariance. It is absent
/// when there are no residual degrees of freedom.
#[derive(Debug, Clone)]
pub struct WeightedFit {
    coefficients: Vec<f64>,
    covariance: Option<DenseMatrix>,
    residual_dof: usize,
    mean_squared_error: Option<f64>,
}

impl WeightedFit {
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn covariance(&self) -> Option<&DenseMatrix> {
        self.covariance.as_ref()
    }

    pub fn residual_dof(&self) -> usize {
        self.residual_dof
    }

    pub fn mean_squared_error(&self) -> Option<f64> {
        self.mean_squared_error
    }

    pub fn standard_error(&self, parameter: usize) -> Option<f64> {
        let covariance = self.covariance.as_ref()?;
        if parameter >= covariance.nrows() {
            return None;
        }
        Some(covariance[(parameter, parameter)].max(0.0).sqrt())
    }

    /// Intercept of a [`fit_line`] result.
    pub fn intercept(&self) -> f64 {
        self.coefficients[0]
    }

    /// Slope of a [`fit_line`] result.
    pub fn slope(&self) -> f64 {
        self.coefficients[1]
    }

    pub fn slope_standard_error(&self) -> Option<f64> {
        self.standard_error(1)
    }
}

/// Fits `y = a + b x` with per-observation variances; coefficients are `[a, b]`.
pub fn fit_line(x: &[f64], y: &[f64], variances: &[f64]) -> Result<WeightedFit, RegressionError> {
    let mut design = DenseMatrix::zeros(x.len(), LINE_PARAMETER_COUNT);
    for (row, &value) in x.iter().enumerate() {
        design[(row, 0)] = 1.0;
        design[(row, 1)] = value;
    }
    weighted_least_squares(&design, y, variances)
}

pub fn weighted_least_squares(
    design: &DenseMatrix,
    observations: &[f64],
    variances: &[f64],
) -> Result<WeightedFit, RegressionError> {
    let rows = design.nrows();
    let parameters = design.ncols();
    if rows != observations.len() {
        return Err(RegressionError::ObservationCountMismatch {
            rows,
            observations: observations.len(),
        });
    }
    if variances.len() != rows {
        return Err(RegressionError::VarianceCountMismatch {
            observations: rows,
            variances: variances.len(),
        });
    }
    if parameters == 0 || rows < parameters {
        return Err(RegressionError::TooFewObservations {
            parameters,
            observations: rows,
        });
    }

    let mut weights = Vec::with_capacity(rows);
    for (index, &variance) in variances.iter().enumerate() {
        if !(variance.is_finite() && variance > 0.0) {
            return Err(RegressionError::InvalidVariance {
                index,
                value: variance,
            });
        }
        weights.push(1.0 / variance);
    }
    for row in 0..rows {
        let finite_row = (0..parameters).all(|col| design[(row, col)].is_finite());
        if !finite_row || !observations[row].is_finite() {
            return Err(RegressionError::NonFiniteObservation { index: row });
        }
    }

    let mut normal = DenseMatrix::zeros(parameters, parameters);
    let mut rhs = vec![0.0; parameters];
    let mut terms = vec![0.0; rows];
    for i in 0..parameters {
        for j in i..parameters {
            for (row, term) in terms.iter_mut().enumerate() {
                *term = weights[row] * design[(row, i)] * design[(row, j)];
            }
            let value = stable_sum(&terms);
            normal[(i, j)] = value;
            normal[(j, i)] = value;
        }
        for (row, term) in terms.iter_mut().enumerate() {
            *term = weights[row] * design[(row, i)] * observations[row];
        }
        rhs[i] = stable_sum(&terms);
    }

    let inverse = invert(&normal)?;
    let coefficients: Vec<f64> = (0..parameters)
        .map(|i| (0..parameters).map(|j| inverse[(i, j)] * rhs[j]).sum())
        .collect();

    for (row, term) in terms.iter_mut().enumerate() {
        let predicted: f64 = (0..parameters)
            .map(|col| design[(row, col)] * coefficients[col])
            .sum();
        let residual = observations[row] - predicted;
        *term = weights[row] * residual * residual;
    }
    let weighted_sse = stable_sum(&terms);

    let residual_dof = rows - parameters;
    let (mean_squared_error, covariance) = if residual_dof == 0 {
        (None, None)
    } else {
        let mse = weighted_sse / residual_dof as f64;
        let mut covariance = DenseMatrix::zeros(parameters, parameters);
        for i in 0..parameters {
            for j in 0..parameters {
                covariance[(i, j)] = mse * inverse[(i, j)];
            }
        }
        (Some(mse), Some(covariance))
    };

    Ok(WeightedFit {
        coefficients,
        covariance,
        residual_dof,
        mean_squared_error,
    })
}

fn invert(matrix: &DenseMatrix) -> Result<DenseMatrix, RegressionError> {
    let dimension = matrix.nrows();
    let threshold = matrix_infinity_norm(matrix) * RELATIVE_PIVOT_EPSILON;
    let mut work = matrix.clone();
    let mut inverse = DenseMatrix::zeros(dimension, dimension);
    for index in 0..dimension {
        inverse[(index, index)] = 1.0;
    }

    for pivot_col in 0..dimension {
        let (pivot_row, pivot_abs) = select_pivot_row(&work, pivot_col);
        if pivot_abs == 0.0 || pivot_abs <= threshold {
            return Err(RegressionError::SingularSystem {
                pivot_index: pivot_col,
            });
        }
        swap_rows(&mut work, pivot_col, pivot_row);
        swap_rows(&mut inverse, pivot_col, pivot_row);

        let pivot = work[(pivot_col, pivot_col)];
        for col in 0..dimension {
            work[(pivot_col, col)] /= pivot;
            inverse[(pivot_col, col)] /= pivot;
        }

        for row in 0..dimension {
            if row == pivot_col {
                continue;
            }
            let factor = work[(row, pivot_col)];
            if factor == 0.0 {
                continue;
            }
            for col in 0..dimension {
                let reduced = work[(row, col)] - factor * work[(pivot_col, col)];
                work[(row, col)] = reduced;
                let reduced = inverse[(row, col)] - factor * inverse[(pivot_col, col)];
                inverse[(row, col)] = reduced;
            }
        }
    }

    Ok(inverse)
}

fn select_pivot_row(matrix: &DenseMatrix, pivot_col: usize) -> (usize, f64) {
    let mut best_row = pivot_col;
    let mut best_abs = matrix[(pivot_col, pivot_col)].abs();

    for row in (pivot_col + 1)..matrix.nrows() {
        let candidate = matrix[(row, pivot_col)].abs();
        if candidate > best_abs {
            best_abs = candidate;
            best_row = row;
        }
    }

    (best_row, best_abs)
}

fn swap_rows(matrix: &mut DenseMatrix, lhs: usize, rhs: usize) {
    if lhs == rhs {
        return;
    }

    for col in 0..matrix.ncols() {
        let value = matrix[(lhs, col)];
        matrix[(lhs, col)] = matrix[(rhs, col)];
        matrix[(rhs, col)] = value;
    }
}

fn matrix_infinity_norm(matrix: &DenseMatrix) -> f64 {
    let mut best_row_sum: f64 = 0.0;
    for row in 0..matrix.nrows() {
        let row_sum: f64 = (0..matrix.ncols()).map(|col| matrix[(row, col)].abs()).sum();
        best_row_sum = best_row_sum.max(row_sum);
    }
    best_row_sum
}
