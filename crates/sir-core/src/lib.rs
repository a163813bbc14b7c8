//! Atmospheric model construction and Stokes-profile synthesis orchestration
//! around an external radiative-transfer engine.

pub mod common;
pub mod domain;
pub mod model;
pub mod numerics;
pub mod synthesis;

pub use domain::{SirError, SirErrorCategory, SirResult};
