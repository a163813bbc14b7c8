use super::DenseMatrix;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeastSquaresError {
    #[error("least squares requires a non-empty system")]
    EmptySystem,
    #[error("right-hand side length mismatch: expected {expected}, got {actual}")]
    RhsLengthMismatch { expected: usize, actual: usize },
    #[error("least squares system is underdetermined: {rows} equations for {cols} unknowns")]
    Underdetermined { rows: usize, cols: usize },
    #[error("design matrix is rank deficient at column {column}")]
    RankDeficient { column: usize },
    #[error(
        "polynomial of degree {degree} needs at least {required} distinct abscissae, got {distinct}"
    )]
    InsufficientDistinctPoints {
        degree: usize,
        required: usize,
        distinct: usize,
    },
    #[error("polynomial fit input length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
}

/// Minimizes `|A c - b|` with Householder QR on column-scaled `A`.
///
/// Columns are scaled to unit norm before factorization and the solution is
/// unscaled afterwards; a pivot below `rows * EPSILON` of the largest pivot is
/// treated as rank deficiency.
pub fn solve_least_squares(
    design: &DenseMatrix,
    rhs: &[f64],
) -> Result<Vec<f64>, LeastSquaresError> {
    let rows = design.nrows();
    let cols = design.ncols();
    if rows == 0 || cols == 0 {
        return Err(LeastSquaresError::EmptySystem);
    }
    if rhs.len() != rows {
        return Err(LeastSquaresError::RhsLengthMismatch {
            expected: rows,
            actual: rhs.len(),
        });
    }
    if rows < cols {
        return Err(LeastSquaresError::Underdetermined { rows, cols });
    }

    let mut qr = design.clone();
    let mut projected = rhs.to_vec();
    let scales = normalize_columns(&mut qr);

    let mut diagonal = vec![0.0; cols];
    for pivot in 0..cols {
        let column_norm = (pivot..rows)
            .map(|row| qr[(row, pivot)] * qr[(row, pivot)])
            .sum::<f64>()
            .sqrt();
        if column_norm == 0.0 {
            return Err(LeastSquaresError::RankDeficient { column: pivot });
        }

        let alpha = if qr[(pivot, pivot)] > 0.0 {
            -column_norm
        } else {
            column_norm
        };
        let mut reflector: Vec<f64> = (pivot..rows).map(|row| qr[(row, pivot)]).collect();
        reflector[0] -= alpha;
        let reflector_norm_sq: f64 = reflector.iter().map(|value| value * value).sum();

        if reflector_norm_sq > 0.0 {
            for col in pivot..cols {
                let dot: f64 = reflector
                    .iter()
                    .enumerate()
                    .map(|(offset, value)| value * qr[(pivot + offset, col)])
                    .sum();
                let factor = 2.0 * dot / reflector_norm_sq;
                for (offset, value) in reflector.iter().enumerate() {
                    qr[(pivot + offset, col)] -= factor * value;
                }
            }

            let dot: f64 = reflector
                .iter()
                .enumerate()
                .map(|(offset, value)| value * projected[pivot + offset])
                .sum();
            let factor = 2.0 * dot / reflector_norm_sq;
            for (offset, value) in reflector.iter().enumerate() {
                projected[pivot + offset] -= factor * value;
            }
        }

        diagonal[pivot] = qr[(pivot, pivot)];
    }

    let largest_pivot = diagonal
        .iter()
        .fold(0.0_f64, |best, value| best.max(value.abs()));
    let rank_tolerance = rows as f64 * f64::EPSILON * largest_pivot;
    if let Some(column) = diagonal
        .iter()
        .position(|value| value.abs() <= rank_tolerance)
    {
        return Err(LeastSquaresError::RankDeficient { column });
    }

    let mut solution = vec![0.0; cols];
    for row in (0..cols).rev() {
        let mut value = projected[row];
        for col in (row + 1)..cols {
            value -= qr[(row, col)] * solution[col];
        }
        solution[row] = value / qr[(row, row)];
    }

    for (value, scale) in solution.iter_mut().zip(scales) {
        *value /= scale;
    }

    Ok(solution)
}

/// Least-squares polynomial fit, coefficients ordered from the highest power down.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>, LeastSquaresError> {
    if x.len() != y.len() {
        return Err(LeastSquaresError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.is_empty() {
        return Err(LeastSquaresError::EmptySystem);
    }

    let required = degree + 1;
    let distinct = count_distinct(x);
    if distinct < required {
        return Err(LeastSquaresError::InsufficientDistinctPoints {
            degree,
            required,
            distinct,
        });
    }

    let mut vandermonde = DenseMatrix::zeros(x.len(), required);
    for (row, abscissa) in x.iter().copied().enumerate() {
        let mut power = 1.0;
        for col in (0..required).rev() {
            vandermonde[(row, col)] = power;
            power *= abscissa;
        }
    }

    solve_least_squares(&vandermonde, y)
}

/// Horner evaluation of coefficients ordered from the highest power down.
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .fold(0.0, |accumulator, coefficient| accumulator * x + coefficient)
}

fn normalize_columns(matrix: &mut DenseMatrix) -> Vec<f64> {
    let mut scales = Vec::with_capacity(matrix.ncols());
    for col in 0..matrix.ncols() {
        let norm = (0..matrix.nrows())
            .map(|row| matrix[(row, col)] * matrix[(row, col)])
            .sum::<f64>()
            .sqrt();
        let scale = if norm > 0.0 { norm } else { 1.0 };
        for row in 0..matrix.nrows() {
            matrix[(row, col)] /= scale;
        }
        scales.push(scale);
    }
    scales
}

fn count_distinct(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}
