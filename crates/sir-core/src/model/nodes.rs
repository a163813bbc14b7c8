//! Expansion of sparse node values into a depth-resolved profile.
//!
//! Three regimes exist:
//!
//! - explicit node depths: monotone cubic through the sorted `(depth, value)` pairs,
//!   evaluated (and extrapolated) on the depth axis; the baseline is not applied,
//! - a single node without depths: constant offset added to the baseline,
//! - `n >= 2` nodes without depths: nodes sit at `n` evenly spaced depth indices and
//!   a degree `n - 1` polynomial in log-tau is added to the baseline.

use crate::domain::{ModelResult, SirError};
use crate::numerics::{MonotoneCubic, linspace, polyfit, polyval};
use tracing::debug;

pub fn interpolate_nodes(
    log_tau: &[f64],
    node_values: &[f64],
    node_depths: Option<&[f64]>,
    baseline: Option<&[f64]>,
) -> ModelResult<Vec<f64>> {
    let depth_count = log_tau.len();
    if depth_count == 0 {
        return Err(SirError::shape(
            "SHAPE.EMPTY_DEPTH_AXIS",
            "log-tau axis must contain at least one depth point",
        ));
    }
    if let Some(baseline) = baseline
        && baseline.len() != depth_count
    {
        return Err(SirError::shape(
            "SHAPE.BASELINE_LENGTH",
            format!(
                "baseline has {} points but the log-tau axis has {}",
                baseline.len(),
                depth_count
            ),
        ));
    }

    if node_values.is_empty() {
        return Ok(vec![0.0; depth_count]);
    }

    if let Some(node_depths) = node_depths {
        if node_depths.len() != node_values.len() {
            return Err(SirError::shape(
                "SHAPE.NODE_DEPTHS",
                format!(
                    "{} node depths supplied for {} node values",
                    node_depths.len(),
                    node_values.len()
                ),
            ));
        }
        if baseline.is_some() {
            debug!("baseline ignored for nodes placed at explicit log-tau depths");
        }

        let spline = MonotoneCubic::from_unsorted(node_depths, node_values)?;
        return Ok(spline.evaluate_many(log_tau));
    }

    let baseline_at = |depth: usize| baseline.map_or(0.0, |values| values[depth]);

    if node_values.len() == 1 {
        let offset = node_values[0];
        return Ok((0..depth_count)
            .map(|depth| baseline_at(depth) + offset)
            .collect());
    }

    let positions = node_positions(depth_count, node_values.len());
    let abscissae: Vec<f64> = positions.iter().map(|&index| log_tau[index]).collect();
    let coefficients = polyfit(&abscissae, node_values, node_values.len() - 1)?;

    Ok(log_tau
        .iter()
        .enumerate()
        .map(|(depth, &tau)| baseline_at(depth) + polyval(&coefficients, tau))
        .collect())
}

/// Depth indices of `node_count` evenly spaced nodes over `[0, depth_count - 1]`.
pub fn node_positions(depth_count: usize, node_count: usize) -> Vec<usize> {
    if depth_count == 0 {
        return Vec::new();
    }

    linspace(0.0, (depth_count - 1) as f64, node_count)
        .into_iter()
        .map(|position| position.round() as usize)
        .collect()
}
