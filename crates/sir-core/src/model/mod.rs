pub mod builder;
pub mod config;
pub mod nodes;
pub mod normalizer;

pub use builder::{ChannelNodes, NodeModel, NodeSpec, build_model};
pub use config::{DepthAxis, ModelConfig, ModelConfigError, load_model_config};
pub use nodes::{interpolate_nodes, node_positions};
pub use normalizer::{
    cartesian_to_spherical, insert_electron_pressure, normalize_model, spherical_to_cartesian,
};

use crate::common::constants::{COLUMN_LOG_TAU, NODE_MODEL_COLUMNS, REDUCED_MODEL_COLUMNS};
use crate::domain::{ModelResult, SirError};
use crate::numerics::DenseMatrix;

/// Prepends the log-tau axis to a node model, giving the 7-column layout
/// `[logTau, T, vmic, B|Bx, v, thetaB|By, phiB|Bz]`.
pub fn assemble_model(log_tau: &[f64], node_model: &NodeModel) -> ModelResult<DenseMatrix> {
    let columns = node_model.matrix();
    if columns.nrows() != log_tau.len() {
        return Err(SirError::shape(
            "SHAPE.DEPTH_AXIS",
            format!(
                "node model has {} depths but the log-tau axis has {}",
                columns.nrows(),
                log_tau.len()
            ),
        ));
    }

    let mut model = DenseMatrix::zeros(log_tau.len(), REDUCED_MODEL_COLUMNS);
    for (row, tau) in log_tau.iter().copied().enumerate() {
        model[(row, COLUMN_LOG_TAU)] = tau;
        for col in 0..NODE_MODEL_COLUMNS {
            model[(row, col + 1)] = columns[(row, col)];
        }
    }
    Ok(model)
}
