use crate::domain::{ProfileError, ProfileResult};

/// Number of unordered pairs among `station_count` stations.
pub const fn pair_count(station_count: usize) -> usize {
    station_count * station_count.saturating_sub(1) / 2
}

/// Pairwise correlations among `members`, in upper-triangle row-major order:
/// `(m0,m1), (m0,m2), .., (m1,m2), ..` where `mi` is the i-th member. The
/// diagonal is left out.
pub fn member_correlations(matrix: &[Vec<f64>], members: &[usize]) -> ProfileResult<Vec<f64>> {
    let mut coefficients = Vec::with_capacity(pair_count(members.len()));
    for (position, &row) in members.iter().enumerate() {
        for &col in &members[position + 1..] {
            let value = matrix
                .get(row)
                .and_then(|values| values.get(col))
                .copied()
                .ok_or_else(|| {
                    ProfileError::internal(
                        "SYS.CORRELATION_INDEX",
                        format!(
                            "correlation pair ({row}, {col}) is outside a {}-station matrix",
                            matrix.len()
                        ),
                    )
                })?;
            coefficients.push(value);
        }
    }
    Ok(coefficients)
}
