use super::nodes::interpolate_nodes;
use crate::common::constants::NODE_MODEL_COLUMNS;
use crate::domain::{FieldFrame, ModelResult, PhysicalChannel};
use crate::numerics::DenseMatrix;
use serde::{Deserialize, Serialize};

/// Node values for one channel plus an optional profile added to their interpolation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ChannelNodes {
    pub nodes: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Vec<f64>>,
}

impl ChannelNodes {
    pub fn new(nodes: impl Into<Vec<f64>>) -> Self {
        Self {
            nodes: nodes.into(),
            baseline: None,
        }
    }

    pub fn with_baseline(mut self, baseline: impl Into<Vec<f64>>) -> Self {
        self.baseline = Some(baseline.into());
        self
    }
}

/// Per-channel nodes for a model build. Channels left as `None` stay at zero.
///
/// The Cartesian aliases (`bx`, `by`, `bz`) fill the same slots as
/// field strength, inclination and azimuth.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_depths: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<ChannelNodes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microturbulence: Option<ChannelNodes>,
    #[serde(default, alias = "bx", skip_serializing_if = "Option::is_none")]
    pub field: Option<ChannelNodes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<ChannelNodes>,
    #[serde(default, alias = "by", skip_serializing_if = "Option::is_none")]
    pub inclination: Option<ChannelNodes>,
    #[serde(default, alias = "bz", skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<ChannelNodes>,
}

impl NodeSpec {
    pub fn with_node_depths(mut self, node_depths: impl Into<Vec<f64>>) -> Self {
        self.node_depths = Some(node_depths.into());
        self
    }

    pub fn with_channel(mut self, channel: PhysicalChannel, nodes: ChannelNodes) -> Self {
        *self.channel_slot(channel) = Some(nodes);
        self
    }

    pub fn channel(&self, channel: PhysicalChannel) -> Option<&ChannelNodes> {
        match channel {
            PhysicalChannel::Temperature => self.temperature.as_ref(),
            PhysicalChannel::Microturbulence => self.microturbulence.as_ref(),
            PhysicalChannel::Field => self.field.as_ref(),
            PhysicalChannel::Velocity => self.velocity.as_ref(),
            PhysicalChannel::Inclination => self.inclination.as_ref(),
            PhysicalChannel::Azimuth => self.azimuth.as_ref(),
        }
    }

    fn channel_slot(&mut self, channel: PhysicalChannel) -> &mut Option<ChannelNodes> {
        match channel {
            PhysicalChannel::Temperature => &mut self.temperature,
            PhysicalChannel::Microturbulence => &mut self.microturbulence,
            PhysicalChannel::Field => &mut self.field,
            PhysicalChannel::Velocity => &mut self.velocity,
            PhysicalChannel::Inclination => &mut self.inclination,
            PhysicalChannel::Azimuth => &mut self.azimuth,
        }
    }
}

/// Depth x 6 node model: T, vmic, B|Bx, v, thetaB|By, phiB|Bz.
///
/// Has no log-tau and no electron-pressure column; see [`super::assemble_model`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeModel {
    frame: FieldFrame,
    columns: DenseMatrix,
}

impl NodeModel {
    pub fn frame(&self) -> FieldFrame {
        self.frame
    }

    pub fn depth_count(&self) -> usize {
        self.columns.nrows()
    }

    pub fn matrix(&self) -> &DenseMatrix {
        &self.columns
    }

    pub fn into_matrix(self) -> DenseMatrix {
        self.columns
    }

    pub fn column(&self, channel: PhysicalChannel) -> Vec<f64> {
        let col = channel.index();
        (0..self.columns.nrows())
            .map(|row| self.columns[(row, col)])
            .collect()
    }
}

pub fn build_model(
    log_tau: &[f64],
    node_spec: &NodeSpec,
    frame: FieldFrame,
) -> ModelResult<NodeModel> {
    let depth_count = log_tau.len();
    let mut columns = DenseMatrix::zeros(depth_count, NODE_MODEL_COLUMNS);

    for channel in PhysicalChannel::ALL {
        let Some(channel_nodes) = node_spec.channel(channel) else {
            continue;
        };

        let profile = interpolate_nodes(
            log_tau,
            &channel_nodes.nodes,
            node_spec.node_depths.as_deref(),
            channel_nodes.baseline.as_deref(),
        )?;
        let col = channel.index();
        for (row, value) in profile.into_iter().enumerate() {
            columns[(row, col)] = value;
        }
    }

    Ok(NodeModel { frame, columns })
}
