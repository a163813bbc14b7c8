//! JSON description of a node-parameterized model.
//!
//! ```json
//! {
//!   "logTau": { "start": -4.0, "stop": 1.0, "count": 51 },
//!   "cartesian": false,
//!   "nodeDepths": [-4.0, -2.0, 0.0],
//!   "temperature": { "nodes": [4500.0, 5600.0, 8000.0] },
//!   "field": { "nodes": [1200.0, 1100.0, 1000.0] }
//! }
//! ```

use super::builder::{NodeSpec, build_model};
use super::assemble_model;
use crate::domain::{FieldFrame, ModelResult, SirError};
use crate::numerics::{DenseMatrix, linspace};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DepthAxis {
    Explicit(Vec<f64>),
    Range { start: f64, stop: f64, count: usize },
}

impl DepthAxis {
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::Explicit(values) => values.clone(),
            Self::Range { start, stop, count } => linspace(*start, *stop, *count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub log_tau: DepthAxis,
    #[serde(default)]
    pub cartesian: bool,
    #[serde(flatten)]
    pub nodes: NodeSpec,
}

impl ModelConfig {
    pub fn frame(&self) -> FieldFrame {
        FieldFrame::from_cartesian_flag(self.cartesian)
    }

    /// Builds the 7-column model described by this configuration.
    pub fn build(&self) -> ModelResult<DenseMatrix> {
        let log_tau = self.log_tau.values();
        let node_model = build_model(&log_tau, &self.nodes, self.frame())?;
        assemble_model(&log_tau, &node_model)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelConfigError {
    #[error("failed to read model configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse model configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<ModelConfigError> for SirError {
    fn from(error: ModelConfigError) -> Self {
        match error {
            ModelConfigError::Read { .. } => {
                SirError::io_system("IO.MODEL_CONFIG", error.to_string())
            }
            ModelConfigError::Parse { .. } => {
                SirError::parse("PARSE.MODEL_CONFIG", error.to_string())
            }
        }
    }
}

pub fn load_model_config(config_path: impl AsRef<Path>) -> Result<ModelConfig, ModelConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ModelConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ModelConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{DepthAxis, ModelConfig, ModelConfigError, load_model_config};
    use crate::domain::{FieldFrame, SirError, SirErrorCategory};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_range_axis_and_builds_reduced_model() {
        let config: ModelConfig = serde_json::from_str(
            r#"{
                "logTau": { "start": -4.0, "stop": 1.0, "count": 6 },
                "temperature": { "nodes": [5000.0] },
                "velocity": { "nodes": [-1.0, 1.0] }
            }"#,
        )
        .expect("config");

        assert_eq!(config.frame(), FieldFrame::Spherical);
        let model = config.build().expect("model");
        assert_eq!((model.nrows(), model.ncols()), (6, 7));
        assert_eq!(model[(0, 0)], -4.0);
        assert_eq!(model[(5, 1)], 5000.0);
        assert!((model[(5, 4)] - 1.0).abs() < 1.0e-10);
    }

    #[test]
    fn parses_explicit_axis_with_cartesian_aliases() {
        let config: ModelConfig = serde_json::from_str(
            r#"{
                "logTau": [-2.0, -1.0, 0.0],
                "cartesian": true,
                "bz": { "nodes": [200.0] }
            }"#,
        )
        .expect("config");

        assert_eq!(config.log_tau, DepthAxis::Explicit(vec![-2.0, -1.0, 0.0]));
        assert_eq!(config.frame(), FieldFrame::Cartesian);
        let model = config.build().expect("model");
        assert_eq!(model[(1, 6)], 200.0);
    }

    #[test]
    fn load_reports_read_and_parse_failures() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("missing.json");
        let error = load_model_config(&missing).expect_err("missing file");
        assert!(matches!(error, ModelConfigError::Read { .. }));
        assert_eq!(
            SirError::from(error).category(),
            SirErrorCategory::IoSystemError
        );

        let broken = temp.path().join("broken.json");
        fs::write(&broken, "{ \"logTau\": ").expect("write");
        let error = load_model_config(&broken).expect_err("broken json");
        assert!(matches!(error, ModelConfigError::Parse { .. }));
        assert_eq!(SirError::from(error).category(), SirErrorCategory::ParseError);
    }
}
