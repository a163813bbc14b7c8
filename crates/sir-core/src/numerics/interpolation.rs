use super::deterministic_argsort;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolationError {
    #[error("monotone cubic interpolation requires at least 2 knots, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("interpolation input length mismatch: knots={knots}, values={values}")]
    LengthMismatch { knots: usize, values: usize },
    #[error("knot must be finite at index {index}, got {value}")]
    NonFiniteKnot { index: usize, value: f64 },
    #[error("knots must be strictly increasing, index {index} has {current} after {previous}")]
    NonIncreasingKnots {
        index: usize,
        previous: f64,
        current: f64,
    },
}

/// Shape-preserving piecewise-cubic Hermite interpolant (Fritsch-Butland slopes).
///
/// Between knots the curve never overshoots the data; outside the knot range the
/// first and last cubic pieces are continued.
#[derive(Debug, Clone, PartialEq)]
pub struct MonotoneCubic {
    knots: Vec<f64>,
    values: Vec<f64>,
    slopes: Vec<f64>,
}

impl MonotoneCubic {
    pub fn new(knots: &[f64], values: &[f64]) -> Result<Self, InterpolationError> {
        validate_knots(knots, values)?;
        let slopes = shape_preserving_slopes(knots, values);
        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            slopes,
        })
    }

    /// Sorts `(knot, value)` pairs by knot before building the interpolant.
    pub fn from_unsorted(knots: &[f64], values: &[f64]) -> Result<Self, InterpolationError> {
        if knots.len() != values.len() {
            return Err(InterpolationError::LengthMismatch {
                knots: knots.len(),
                values: values.len(),
            });
        }

        let order = deterministic_argsort(knots);
        let sorted_knots: Vec<f64> = order.iter().map(|&index| knots[index]).collect();
        let sorted_values: Vec<f64> = order.iter().map(|&index| values[index]).collect();
        Self::new(&sorted_knots, &sorted_values)
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let last_interval = self.knots.len() - 2;
        let upper = self.knots.partition_point(|&knot| knot <= x);
        let interval = upper.saturating_sub(1).min(last_interval);

        let x0 = self.knots[interval];
        let x1 = self.knots[interval + 1];
        let h = x1 - x0;
        let t = (x - x0) / h;
        let one_minus_t = 1.0 - t;

        let h00 = (1.0 + 2.0 * t) * one_minus_t * one_minus_t;
        let h10 = t * one_minus_t * one_minus_t;
        let h01 = t * t * (3.0 - 2.0 * t);
        let h11 = t * t * (t - 1.0);

        h00 * self.values[interval]
            + h10 * h * self.slopes[interval]
            + h01 * self.values[interval + 1]
            + h11 * h * self.slopes[interval + 1]
    }

    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

fn validate_knots(knots: &[f64], values: &[f64]) -> Result<(), InterpolationError> {
    if knots.len() != values.len() {
        return Err(InterpolationError::LengthMismatch {
            knots: knots.len(),
            values: values.len(),
        });
    }
    if knots.len() < 2 {
        return Err(InterpolationError::InsufficientPoints {
            actual: knots.len(),
        });
    }

    for (index, value) in knots.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(InterpolationError::NonFiniteKnot { index, value });
        }

        if index > 0 {
            let previous = knots[index - 1];
            if value <= previous {
                return Err(InterpolationError::NonIncreasingKnots {
                    index,
                    previous,
                    current: value,
                });
            }
        }
    }

    Ok(())
}

fn shape_preserving_slopes(knots: &[f64], values: &[f64]) -> Vec<f64> {
    let count = knots.len();
    let widths: Vec<f64> = knots.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let secants: Vec<f64> = values
        .windows(2)
        .zip(&widths)
        .map(|(pair, width)| (pair[1] - pair[0]) / width)
        .collect();

    if count == 2 {
        return vec![secants[0]; 2];
    }

    let mut slopes = vec![0.0; count];
    for interior in 1..(count - 1) {
        let m0 = secants[interior - 1];
        let m1 = secants[interior];
        let h0 = widths[interior - 1];
        let h1 = widths[interior];

        // Local extremum or flat segment: pin the slope to zero.
        if sign(m0) != sign(m1) || m0 == 0.0 || m1 == 0.0 {
            continue;
        }

        let w1 = 2.0 * h1 + h0;
        let w2 = h1 + 2.0 * h0;
        let weighted_harmonic_mean = (w1 / m0 + w2 / m1) / (w1 + w2);
        slopes[interior] = 1.0 / weighted_harmonic_mean;
    }

    slopes[0] = edge_slope(widths[0], widths[1], secants[0], secants[1]);
    slopes[count - 1] = edge_slope(
        widths[count - 2],
        widths[count - 3],
        secants[count - 2],
        secants[count - 3],
    );

    slopes
}

/// One-sided three-point estimate, limited so the end piece stays monotone.
fn edge_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let slope = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(slope) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && slope.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        slope
    }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{InterpolationError, MonotoneCubic};

    #[test]
    fn interpolant_passes_through_every_knot() {
        let knots = [-4.0, -2.5, -1.0, 0.0, 1.0];
        let values = [4200.0, 4900.0, 5600.0, 6400.0, 8900.0];
        let spline = MonotoneCubic::new(&knots, &values).expect("monotone cubic");

        for (knot, value) in knots.iter().zip(values) {
            assert!((spline.evaluate(*knot) - value).abs() <= 1.0e-9);
        }
    }

    #[test]
    fn interpolant_does_not_overshoot_monotone_data() {
        let knots = [0.0, 1.0, 2.0, 3.0];
        let values = [0.0, 0.1, 5.0, 5.1];
        let spline = MonotoneCubic::new(&knots, &values).expect("monotone cubic");

        let mut previous = spline.evaluate(0.0);
        for step in 1..=300 {
            let x = 3.0 * step as f64 / 300.0;
            let current = spline.evaluate(x);
            assert!(current >= previous - 1.0e-12, "decrease at x={x}");
            assert!((0.0..=5.1 + 1.0e-12).contains(&current));
            previous = current;
        }
    }

    #[test]
    fn local_extremum_gets_flat_slope() {
        let spline =
            MonotoneCubic::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).expect("monotone cubic");
        assert_eq!(spline.slopes()[1], 0.0);
        assert!((spline.evaluate(1.0) - 1.0).abs() <= 1.0e-15);
    }

    #[test]
    fn two_knots_reduce_to_linear_interpolation_and_extrapolation() {
        let spline = MonotoneCubic::new(&[0.0, 2.0], &[1.0, 5.0]).expect("monotone cubic");
        assert!((spline.evaluate(1.0) - 3.0).abs() <= 1.0e-12);
        assert!((spline.evaluate(-1.0) + 1.0).abs() <= 1.0e-12);
        assert!((spline.evaluate(3.0) - 7.0).abs() <= 1.0e-12);
    }

    #[test]
    fn edge_slope_follows_three_point_formula() {
        // h0 = h1 = 1, m0 = 1, m1 = 2 -> ((2 + 1) * 1 - 2) / 2 = 0.5
        let spline =
            MonotoneCubic::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 3.0]).expect("monotone cubic");
        assert!((spline.slopes()[0] - 0.5).abs() <= 1.0e-15);
        // Interior: w1 = w2 = 3 -> 1 / ((3 / 1 + 3 / 2) / 6) = 4 / 3
        assert!((spline.slopes()[1] - 4.0 / 3.0).abs() <= 1.0e-15);
    }

    #[test]
    fn unsorted_knots_are_sorted_with_their_values() {
        let spline = MonotoneCubic::from_unsorted(&[1.0, -1.0, 0.0], &[10.0, -10.0, 0.0])
            .expect("monotone cubic");
        assert_eq!(spline.knots(), &[-1.0, 0.0, 1.0]);
        assert!((spline.evaluate(-1.0) + 10.0).abs() <= 1.0e-12);
    }

    #[test]
    fn rejects_invalid_knots() {
        assert_eq!(
            MonotoneCubic::new(&[0.0], &[1.0]).expect_err("single knot"),
            InterpolationError::InsufficientPoints { actual: 1 }
        );
        assert_eq!(
            MonotoneCubic::from_unsorted(&[0.0, 1.0, 1.0], &[1.0, 2.0, 3.0])
                .expect_err("duplicate knot"),
            InterpolationError::NonIncreasingKnots {
                index: 2,
                previous: 1.0,
                current: 1.0,
            }
        );
        assert_eq!(
            MonotoneCubic::new(&[0.0, 1.0], &[1.0]).expect_err("length mismatch"),
            InterpolationError::LengthMismatch {
                knots: 2,
                values: 1,
            }
        );
    }
}
