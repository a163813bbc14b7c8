pub mod errors;

pub use errors::{ModelResult, SirError, SirErrorCategory, SirResult, SynthesisResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// How the three magnetic columns of a model are parameterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFrame {
    /// Strength [G], inclination [deg], azimuth [deg].
    #[default]
    Spherical,
    /// Bx, By, Bz [G].
    Cartesian,
}

impl FieldFrame {
    pub const fn from_cartesian_flag(cartesian: bool) -> Self {
        if cartesian {
            Self::Cartesian
        } else {
            Self::Spherical
        }
    }

    pub const fn is_cartesian(self) -> bool {
        matches!(self, Self::Cartesian)
    }
}

/// The six depth-stratified quantities parameterized by nodes, in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalChannel {
    Temperature,
    Microturbulence,
    Field,
    Velocity,
    Inclination,
    Azimuth,
}

impl PhysicalChannel {
    pub const ALL: [Self; 6] = [
        Self::Temperature,
        Self::Microturbulence,
        Self::Field,
        Self::Velocity,
        Self::Inclination,
        Self::Azimuth,
    ];

    /// Column of this channel in the 6-column node model.
    pub const fn index(self) -> usize {
        match self {
            Self::Temperature => 0,
            Self::Microturbulence => 1,
            Self::Field => 2,
            Self::Velocity => 3,
            Self::Inclination => 4,
            Self::Azimuth => 5,
        }
    }

    pub const fn label(self, frame: FieldFrame) -> &'static str {
        match (self, frame) {
            (Self::Temperature, _) => "T",
            (Self::Microturbulence, _) => "vmic",
            (Self::Field, FieldFrame::Spherical) => "B",
            (Self::Field, FieldFrame::Cartesian) => "Bx",
            (Self::Velocity, _) => "v",
            (Self::Inclination, FieldFrame::Spherical) => "thetaB",
            (Self::Inclination, FieldFrame::Cartesian) => "By",
            (Self::Azimuth, FieldFrame::Spherical) => "phiB",
            (Self::Azimuth, FieldFrame::Cartesian) => "Bz",
        }
    }
}

impl Display for PhysicalChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label(FieldFrame::Spherical))
    }
}

/// Physical variables for which the engine returns depth-resolved response functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseVariable {
    Temperature,
    ElectronPressure,
    Microturbulence,
    Field,
    Velocity,
    Inclination,
    Azimuth,
}

impl ResponseVariable {
    pub const ALL: [Self; 7] = [
        Self::Temperature,
        Self::ElectronPressure,
        Self::Microturbulence,
        Self::Field,
        Self::Velocity,
        Self::Inclination,
        Self::Azimuth,
    ];

    /// Position in the engine's response-function list.
    pub const fn index(self) -> usize {
        match self {
            Self::Temperature => 0,
            Self::ElectronPressure => 1,
            Self::Microturbulence => 2,
            Self::Field => 3,
            Self::Velocity => 4,
            Self::Inclination => 5,
            Self::Azimuth => 6,
        }
    }

    /// Column of this variable in the canonical 8-column model.
    pub const fn model_column(self) -> usize {
        self.index() + 1
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "T",
            Self::ElectronPressure => "Pe",
            Self::Microturbulence => "vmic",
            Self::Field => "B",
            Self::Velocity => "v",
            Self::Inclination => "thetaB",
            Self::Azimuth => "phiB",
        }
    }
}

impl Display for ResponseVariable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
