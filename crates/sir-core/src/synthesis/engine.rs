//! Seam to the external synthesis engine and the arrays exchanged with it.
//!
//! The engine keeps process-wide state (line grid, PSF, line database), so a
//! binding is driven through `&mut self` by exactly one [`super::Session`].

use super::line_grid::LineGrid;
use crate::common::constants::{DEPARTURE_LEVELS, STOKES_COMPONENTS, STOKES_ROWS};
use crate::domain::{ResponseVariable, SirError, SirResult};
use crate::numerics::DenseMatrix;
use std::error::Error;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub trait SynthesisEngine {
    /// Loads the line grid; returns the number of wavelength samples.
    fn initialize(&mut self, grid: &LineGrid, working_dir: &Path) -> Result<usize, EngineError>;

    fn set_psf(&mut self, psf: &Psf) -> Result<(), EngineError>;

    fn synthesize(&mut self, input: &SynthesisInput<'_>) -> Result<StokesProfiles, EngineError>;

    fn synthesize_with_response(
        &mut self,
        input: &SynthesisInput<'_>,
    ) -> Result<(StokesProfiles, ResponseFunctions), EngineError>;
}

/// Arguments of one engine call. `model` is always the 8-column spherical layout.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub model: &'a DenseMatrix,
    pub departure: &'a DepartureCoefficients,
    pub macroturbulence: f64,
    pub filling_factor: f64,
    pub stray: f64,
}

/// Spectral PSF: offsets from the maximum [mA] and unnormalized transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct Psf {
    offsets: Vec<f64>,
    weights: Vec<f64>,
}

impl Psf {
    pub fn new(offsets: Vec<f64>, weights: Vec<f64>) -> SirResult<Self> {
        if offsets.is_empty() {
            return Err(SirError::shape("SHAPE.PSF", "PSF must contain at least one sample"));
        }
        if offsets.len() != weights.len() {
            return Err(SirError::shape(
                "SHAPE.PSF",
                format!(
                    "PSF offsets and weights differ in length: {} vs {}",
                    offsets.len(),
                    weights.len()
                ),
            ));
        }
        Ok(Self { offsets, weights })
    }

    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Non-LTE departure coefficients, shape `(2, lines, depths)`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureCoefficients {
    line_count: usize,
    depth_count: usize,
    values: Vec<f64>,
}

impl DepartureCoefficients {
    /// All ones: the LTE limit.
    pub fn lte(line_count: usize, depth_count: usize) -> Self {
        Self {
            line_count,
            depth_count,
            values: vec![1.0; DEPARTURE_LEVELS * line_count * depth_count],
        }
    }

    pub fn from_values(line_count: usize, depth_count: usize, values: Vec<f64>) -> SirResult<Self> {
        let expected = DEPARTURE_LEVELS * line_count * depth_count;
        if values.len() != expected {
            return Err(SirError::shape(
                "SHAPE.DEPARTURE",
                format!(
                    "departure coefficients need {expected} values for shape ({DEPARTURE_LEVELS}, {line_count}, {depth_count}), got {}",
                    values.len()
                ),
            ));
        }
        Ok(Self {
            line_count,
            depth_count,
            values,
        })
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (DEPARTURE_LEVELS, self.line_count, self.depth_count)
    }

    pub fn get(&self, level: usize, line: usize, depth: usize) -> f64 {
        self.values[(level * self.line_count + line) * self.depth_count + depth]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StokesComponent {
    I,
    Q,
    U,
    V,
}

impl StokesComponent {
    pub const ALL: [Self; 4] = [Self::I, Self::Q, Self::U, Self::V];

    pub const fn index(self) -> usize {
        match self {
            Self::I => 0,
            Self::Q => 1,
            Self::U => 2,
            Self::V => 3,
        }
    }
}

/// `(5, nLambda)`: wavelength offset [mA] followed by Stokes I, Q, U, V.
#[derive(Debug, Clone, PartialEq)]
pub struct StokesProfiles {
    data: DenseMatrix,
}

impl StokesProfiles {
    pub fn from_matrix(data: DenseMatrix) -> Self {
        Self { data }
    }

    pub fn zeros(wavelength_count: usize) -> Self {
        Self::from_matrix(DenseMatrix::zeros(STOKES_ROWS, wavelength_count))
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.data.nrows(), self.data.ncols())
    }

    pub fn wavelength_count(&self) -> usize {
        self.data.ncols()
    }

    pub fn matrix(&self) -> &DenseMatrix {
        &self.data
    }

    pub fn matrix_mut(&mut self) -> &mut DenseMatrix {
        &mut self.data
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        self.row(0)
    }

    pub fn component(&self, component: StokesComponent) -> Vec<f64> {
        self.row(component.index() + 1)
    }

    fn row(&self, row: usize) -> Vec<f64> {
        (0..self.data.ncols()).map(|col| self.data[(row, col)]).collect()
    }
}

/// `(4, nLambda, nDepth)` response of Stokes I, Q, U, V to one variable, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCube {
    wavelength_count: usize,
    depth_count: usize,
    values: Vec<f64>,
}

impl ResponseCube {
    pub fn zeros(wavelength_count: usize, depth_count: usize) -> Self {
        Self {
            wavelength_count,
            depth_count,
            values: vec![0.0; STOKES_COMPONENTS * wavelength_count * depth_count],
        }
    }

    pub fn from_values(
        wavelength_count: usize,
        depth_count: usize,
        values: Vec<f64>,
    ) -> SirResult<Self> {
        let expected = STOKES_COMPONENTS * wavelength_count * depth_count;
        if values.len() != expected {
            return Err(SirError::shape(
                "SHAPE.RESPONSE",
                format!(
                    "response cube ({STOKES_COMPONENTS}, {wavelength_count}, {depth_count}) needs {expected} values, got {}",
                    values.len()
                ),
            ));
        }
        Ok(Self {
            wavelength_count,
            depth_count,
            values,
        })
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (STOKES_COMPONENTS, self.wavelength_count, self.depth_count)
    }

    pub fn get(&self, component: StokesComponent, wavelength: usize, depth: usize) -> f64 {
        self.values[self.offset(component, wavelength, depth)]
    }

    pub fn set(&mut self, component: StokesComponent, wavelength: usize, depth: usize, value: f64) {
        let offset = self.offset(component, wavelength, depth);
        self.values[offset] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    fn offset(&self, component: StokesComponent, wavelength: usize, depth: usize) -> usize {
        (component.index() * self.wavelength_count + wavelength) * self.depth_count + depth
    }
}

/// Response functions to T, Pe, vmic, B, v, inclination and azimuth, plus the
/// depth-independent `(4, nLambda)` response to macroturbulence.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFunctions {
    per_depth: Vec<ResponseCube>,
    macroturbulence: DenseMatrix,
}

impl ResponseFunctions {
    pub fn new(per_depth: Vec<ResponseCube>, macroturbulence: DenseMatrix) -> SirResult<Self> {
        if per_depth.len() != ResponseVariable::ALL.len() {
            return Err(SirError::shape(
                "SHAPE.RESPONSE",
                format!(
                    "expected {} depth-resolved response functions, got {}",
                    ResponseVariable::ALL.len(),
                    per_depth.len()
                ),
            ));
        }
        Ok(Self {
            per_depth,
            macroturbulence,
        })
    }

    pub fn get(&self, variable: ResponseVariable) -> &ResponseCube {
        &self.per_depth[variable.index()]
    }

    pub fn per_depth(&self) -> &[ResponseCube] {
        &self.per_depth
    }

    pub fn macroturbulence(&self) -> &DenseMatrix {
        &self.macroturbulence
    }
}
