//! Model layout and boundary constants shared by the builder, normalizer and session.
//!
//! The electron-pressure boundary value is the one the synthesis engine expects at
//! the deepest point when the pressure stratification is left to the engine.

use std::f64::consts::PI;

pub const RADDEG: f64 = 180.0 / PI;

/// Added to the field strength before `arccos(Bz / B)` so a null field stays finite.
pub const FIELD_STRENGTH_REGULARIZATION: f64 = 1.0e-8;

/// Electron pressure [dyn cm^-2] written into the last row of an inserted Pe column.
pub const ELECTRON_PRESSURE_BOUNDARY: f64 = 1.11634e-01;

/// Marks an electron pressure the engine must compute itself.
pub const ELECTRON_PRESSURE_UNSET: f64 = -1.0;

pub const NODE_MODEL_COLUMNS: usize = 6;
pub const REDUCED_MODEL_COLUMNS: usize = 7;
pub const FULL_MODEL_COLUMNS: usize = 8;

pub const COLUMN_LOG_TAU: usize = 0;
pub const COLUMN_TEMPERATURE: usize = 1;
pub const COLUMN_ELECTRON_PRESSURE: usize = 2;
pub const COLUMN_MICROTURBULENCE: usize = 3;
pub const COLUMN_FIELD: usize = 4;
pub const COLUMN_VELOCITY: usize = 5;
pub const COLUMN_INCLINATION: usize = 6;
pub const COLUMN_AZIMUTH: usize = 7;

pub const STOKES_ROWS: usize = 5;
pub const STOKES_COMPONENTS: usize = 4;
pub const DEPARTURE_LEVELS: usize = 2;

pub const GRID_FILE_NAME: &str = "malla.grid";
pub const LINE_DATABASE_FILE_NAME: &str = "LINEAS";
pub const THEVENIN_FILE_NAME: &str = "THEVENIN";
pub const DATA_DIR_ENV: &str = "SIR_DATA_DIR";

#[cfg(test)]
mod tests {
    use super::{
        COLUMN_AZIMUTH, COLUMN_ELECTRON_PRESSURE, ELECTRON_PRESSURE_BOUNDARY, FULL_MODEL_COLUMNS,
        PI, RADDEG,
    };

    #[test]
    fn constants_match_expected_relationships() {
        assert!((RADDEG * PI - 180.0).abs() <= 1.0e-12);
        assert_eq!(COLUMN_AZIMUTH + 1, FULL_MODEL_COLUMNS);
        assert_eq!(COLUMN_ELECTRON_PRESSURE, 2);
        assert_eq!(ELECTRON_PRESSURE_BOUNDARY, 0.111634);
    }
}
