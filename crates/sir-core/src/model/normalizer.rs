use crate::common::constants::{
    COLUMN_AZIMUTH, COLUMN_ELECTRON_PRESSURE, COLUMN_FIELD, COLUMN_INCLINATION,
    ELECTRON_PRESSURE_BOUNDARY, ELECTRON_PRESSURE_UNSET, FIELD_STRENGTH_REGULARIZATION,
    FULL_MODEL_COLUMNS, RADDEG, REDUCED_MODEL_COLUMNS,
};
use crate::domain::{FieldFrame, ModelResult, SirError};
use crate::numerics::DenseMatrix;
use tracing::debug;

/// Produces the canonical 8-column spherical-field model the engine consumes.
///
/// A 7-column input gets an electron-pressure column at index 2 filled with
/// [`ELECTRON_PRESSURE_UNSET`] except for the deepest row, which holds
/// [`ELECTRON_PRESSURE_BOUNDARY`]. A Cartesian input has columns 4, 6 and 7
/// replaced by strength, inclination and azimuth.
pub fn normalize_model(model: &DenseMatrix, frame: FieldFrame) -> ModelResult<DenseMatrix> {
    if model.nrows() == 0 {
        return Err(SirError::shape(
            "SHAPE.EMPTY_MODEL",
            "model must contain at least one depth point",
        ));
    }

    let mut normalized = match model.ncols() {
        REDUCED_MODEL_COLUMNS => insert_electron_pressure(model),
        FULL_MODEL_COLUMNS => model.clone(),
        other => {
            return Err(SirError::shape(
                "SHAPE.MODEL_COLUMNS",
                format!(
                    "model has {other} columns, expected {REDUCED_MODEL_COLUMNS} or {FULL_MODEL_COLUMNS}"
                ),
            ));
        }
    };

    if frame.is_cartesian() {
        convert_field_to_spherical(&mut normalized);
    }

    debug!(
        depths = normalized.nrows(),
        input_columns = model.ncols(),
        cartesian = frame.is_cartesian(),
        "normalized atmospheric model"
    );
    Ok(normalized)
}

/// Widens a 7-column model to 8 columns with the electron-pressure boundary condition.
pub fn insert_electron_pressure(model: &DenseMatrix) -> DenseMatrix {
    let rows = model.nrows();
    let mut widened = DenseMatrix::zeros(rows, model.ncols() + 1);

    for row in 0..rows {
        for col in 0..model.ncols() {
            let target = if col < COLUMN_ELECTRON_PRESSURE {
                col
            } else {
                col + 1
            };
            widened[(row, target)] = model[(row, col)];
        }
        widened[(row, COLUMN_ELECTRON_PRESSURE)] = ELECTRON_PRESSURE_UNSET;
    }

    if rows > 0 {
        widened[(rows - 1, COLUMN_ELECTRON_PRESSURE)] = ELECTRON_PRESSURE_BOUNDARY;
    }

    widened
}

/// `(Bx, By, Bz)` -> `(B, inclination [deg], azimuth [deg])`.
pub fn cartesian_to_spherical(bx: f64, by: f64, bz: f64) -> (f64, f64, f64) {
    let strength = (bx * bx + by * by + bz * bz).sqrt();
    let inclination = RADDEG * (bz / (strength + FIELD_STRENGTH_REGULARIZATION)).acos();
    let azimuth = RADDEG * by.atan2(bx);
    (strength, inclination, azimuth)
}

/// `(B, inclination [deg], azimuth [deg])` -> `(Bx, By, Bz)`.
pub fn spherical_to_cartesian(strength: f64, inclination: f64, azimuth: f64) -> (f64, f64, f64) {
    let theta = inclination / RADDEG;
    let phi = azimuth / RADDEG;
    (
        strength * theta.sin() * phi.cos(),
        strength * theta.sin() * phi.sin(),
        strength * theta.cos(),
    )
}

fn convert_field_to_spherical(model: &mut DenseMatrix) {
    for row in 0..model.nrows() {
        let (strength, inclination, azimuth) = cartesian_to_spherical(
            model[(row, COLUMN_FIELD)],
            model[(row, COLUMN_INCLINATION)],
            model[(row, COLUMN_AZIMUTH)],
        );
        model[(row, COLUMN_FIELD)] = strength;
        model[(row, COLUMN_INCLINATION)] = inclination;
        model[(row, COLUMN_AZIMUTH)] = azimuth;
    }
}
