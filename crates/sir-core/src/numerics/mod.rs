pub mod interpolation;
pub mod lstsq;

pub use interpolation::{InterpolationError, MonotoneCubic};
pub use lstsq::{LeastSquaresError, polyfit, polyval, solve_least_squares};

use crate::domain::SirError;
use faer::Mat;

pub type DenseMatrix = Mat<f64>;

impl From<InterpolationError> for SirError {
    fn from(error: InterpolationError) -> Self {
        SirError::fit("FIT.MONOTONE_CUBIC", error.to_string())
    }
}

impl From<LeastSquaresError> for SirError {
    fn from(error: LeastSquaresError) -> Self {
        SirError::fit("FIT.POLYNOMIAL", error.to_string())
    }
}

/// Indices that sort `values` ascending; ties keep their original order.
pub fn deterministic_argsort(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_unstable_by(|lhs, rhs| {
        values[*lhs]
            .total_cmp(&values[*rhs])
            .then_with(|| lhs.cmp(rhs))
    });
    indices
}

/// `count` points from `start` to `stop`, both ends included.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count)
                .map(|index| {
                    if index == count - 1 {
                        stop
                    } else {
                        start + step * index as f64
                    }
                })
                .collect()
        }
    }
}
