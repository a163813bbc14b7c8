use super::engine::{
    DepartureCoefficients, Psf, ResponseCube, ResponseFunctions, StokesComponent, StokesProfiles,
    SynthesisEngine, SynthesisInput,
};
use super::line_grid::LineGrid;
use super::reference::{default_data_dir, ensure_reference_files, read_line_listing, write_line_listing};
use crate::common::constants::{
    DEPARTURE_LEVELS, LINE_DATABASE_FILE_NAME, STOKES_COMPONENTS, STOKES_ROWS,
};
use crate::domain::{FieldFrame, ResponseVariable, SirError, SirResult, SynthesisResult};
use crate::model::normalize_model;
use crate::numerics::DenseMatrix;
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    working_dir: PathBuf,
    data_dir: PathBuf,
    write_grid_file: bool,
}

impl SessionOptions {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            data_dir: default_data_dir(),
            write_grid_file: true,
        }
    }

    /// Options rooted at the process working directory.
    pub fn from_env() -> SirResult<Self> {
        let working_dir = std::env::current_dir().map_err(|source| {
            SirError::io_system(
                "IO.CURRENT_DIR",
                format!("failed to read current working directory: {}", source),
            )
        })?;
        Ok(Self::new(working_dir))
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_grid_file(mut self, write_grid_file: bool) -> Self {
        self.write_grid_file = write_grid_file;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn writes_grid_file(&self) -> bool {
        self.write_grid_file
    }
}

/// Per-call synthesis settings. Defaults: LTE departure, no macroturbulence,
/// filling factor 1, no stray light, response functions requested, spherical field.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisParams {
    pub departure: Option<DepartureCoefficients>,
    pub macroturbulence: f64,
    pub filling_factor: f64,
    pub stray: f64,
    pub return_response: bool,
    pub frame: FieldFrame,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            departure: None,
            macroturbulence: 0.0,
            filling_factor: 1.0,
            stray: 0.0,
            return_response: true,
            frame: FieldFrame::Spherical,
        }
    }
}

impl SynthesisParams {
    pub fn with_departure(mut self, departure: DepartureCoefficients) -> Self {
        self.departure = Some(departure);
        self
    }

    pub fn with_macroturbulence(mut self, macroturbulence: f64) -> Self {
        self.macroturbulence = macroturbulence;
        self
    }

    pub fn with_filling_factor(mut self, filling_factor: f64) -> Self {
        self.filling_factor = filling_factor;
        self
    }

    pub fn with_stray(mut self, stray: f64) -> Self {
        self.stray = stray;
        self
    }

    pub fn with_response(mut self, return_response: bool) -> Self {
        self.return_response = return_response;
        self
    }

    pub fn with_frame(mut self, frame: FieldFrame) -> Self {
        self.frame = frame;
        self
    }
}

/// Result of [`Session::synthesize`]; the variant follows `return_response`.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutput {
    SpectrumOnly(StokesProfiles),
    SpectrumWithResponse {
        stokes: StokesProfiles,
        response: ResponseFunctions,
    },
}

impl SynthesisOutput {
    pub fn stokes(&self) -> &StokesProfiles {
        match self {
            Self::SpectrumOnly(stokes) | Self::SpectrumWithResponse { stokes, .. } => stokes,
        }
    }

    pub fn response(&self) -> Option<&ResponseFunctions> {
        match self {
            Self::SpectrumOnly(_) => None,
            Self::SpectrumWithResponse { response, .. } => Some(response),
        }
    }

    pub fn into_parts(self) -> (StokesProfiles, Option<ResponseFunctions>) {
        match self {
            Self::SpectrumOnly(stokes) => (stokes, None),
            Self::SpectrumWithResponse { stokes, response } => (stokes, Some(response)),
        }
    }
}

/// Exclusive owner of one engine binding for a fixed line selection.
#[derive(Debug)]
pub struct Session<E> {
    engine: E,
    grid: LineGrid,
    options: SessionOptions,
    n_lines: usize,
    n_lambda: usize,
    psf: Option<Psf>,
}

impl<E: SynthesisEngine> Session<E> {
    /// Writes `malla.grid`, makes sure `LINEAS` and `THEVENIN` are present in
    /// the working directory and loads the grid into the engine.
    pub fn initialize(mut engine: E, grid: LineGrid, options: SessionOptions) -> SirResult<Self> {
        if grid.groups().is_empty() {
            return Err(SirError::parse(
                "PARSE.LINE_GRID",
                "at least one line group is required",
            ));
        }
        let n_lines = grid.line_count();

        if options.write_grid_file {
            grid.write_to(&options.working_dir)?;
        }
        ensure_reference_files(&options.working_dir, &options.data_dir)?;

        let n_lambda = engine
            .initialize(&grid, &options.working_dir)
            .map_err(|error| SirError::engine("ENGINE.INITIALIZE", error))?;

        info!(
            groups = grid.groups().len(),
            n_lines,
            n_lambda,
            working_dir = %options.working_dir.display(),
            "synthesis session initialized"
        );

        Ok(Self {
            engine,
            grid,
            options,
            n_lines,
            n_lambda,
            psf: None,
        })
    }

    pub fn n_lines(&self) -> usize {
        self.n_lines
    }

    pub fn n_lambda(&self) -> usize {
        self.n_lambda
    }

    pub fn line_grid(&self) -> &LineGrid {
        &self.grid
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn psf(&self) -> Option<&Psf> {
        self.psf.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Replaces the spectral PSF. Weights are forwarded as given.
    pub fn set_psf(&mut self, psf: Psf) -> SirResult<()> {
        self.engine
            .set_psf(&psf)
            .map_err(|error| SirError::engine("ENGINE.PSF", error))?;
        debug!(samples = psf.len(), "spectral PSF replaced");
        self.psf = Some(psf);
        Ok(())
    }

    /// Entries of the `LINEAS` database in the working directory.
    pub fn list_lines(&self) -> SirResult<Vec<String>> {
        read_line_listing(&self.options.working_dir.join(LINE_DATABASE_FILE_NAME))
    }

    pub fn print_line_listing<W: Write>(&self, out: &mut W) -> SirResult<()> {
        let entries = self.list_lines()?;
        write_line_listing(out, &entries).map_err(|source| {
            SirError::io_system(
                "IO.LINE_LISTING",
                format!("failed to write line listing: {}", source),
            )
        })
    }

    pub fn synthesize(
        &mut self,
        model: &DenseMatrix,
        params: &SynthesisParams,
    ) -> SynthesisResult<SynthesisOutput> {
        let normalized = normalize_model(model, params.frame)?;
        self.run(&normalized, params, params.return_response)
    }

    /// Finite-difference response of Stokes I, Q, U, V to `variable`.
    ///
    /// Each depth point of the normalized model is perturbed by `step` in turn
    /// and synthesized without response functions. The returned cube has the
    /// same `(4, nLambda, nDepth)` layout as the engine's response functions.
    pub fn numerical_response(
        &mut self,
        model: &DenseMatrix,
        variable: ResponseVariable,
        step: f64,
        params: &SynthesisParams,
    ) -> SynthesisResult<ResponseCube> {
        if !step.is_finite() || step == 0.0 {
            return Err(SirError::parse(
                "PARSE.RESPONSE_STEP",
                format!("finite-difference step must be finite and non-zero, got {step}"),
            ));
        }

        let normalized = normalize_model(model, params.frame)?;
        let depth_count = normalized.nrows();
        let column = variable.model_column();
        let reference = self.run(&normalized, params, false)?.into_parts().0;

        let mut cube = ResponseCube::zeros(self.n_lambda, depth_count);
        let mut perturbed = normalized.clone();
        for depth in 0..depth_count {
            perturbed[(depth, column)] = normalized[(depth, column)] + step;
            let stokes = self.run(&perturbed, params, false)?.into_parts().0;
            perturbed[(depth, column)] = normalized[(depth, column)];

            for component in StokesComponent::ALL {
                let row = component.index() + 1;
                for wavelength in 0..self.n_lambda {
                    let difference = stokes.matrix()[(row, wavelength)]
                        - reference.matrix()[(row, wavelength)];
                    cube.set(component, wavelength, depth, difference / step);
                }
            }
        }

        debug!(
            variable = %variable,
            step,
            depths = depth_count,
            "numerical response computed"
        );
        Ok(cube)
    }

    fn run(
        &mut self,
        model: &DenseMatrix,
        params: &SynthesisParams,
        return_response: bool,
    ) -> SynthesisResult<SynthesisOutput> {
        let depth_count = model.nrows();
        let departure = match &params.departure {
            Some(departure) => {
                let expected = (DEPARTURE_LEVELS, self.n_lines, depth_count);
                if departure.shape() != expected {
                    return Err(SirError::shape(
                        "SHAPE.DEPARTURE",
                        format!(
                            "departure coefficients have shape {:?}, expected {:?}",
                            departure.shape(),
                            expected
                        ),
                    ));
                }
                Cow::Borrowed(departure)
            }
            None => Cow::Owned(DepartureCoefficients::lte(self.n_lines, depth_count)),
        };

        let input = SynthesisInput {
            model,
            departure: &departure,
            macroturbulence: params.macroturbulence,
            filling_factor: params.filling_factor,
            stray: params.stray,
        };
        debug!(
            depths = depth_count,
            return_response,
            macroturbulence = params.macroturbulence,
            filling_factor = params.filling_factor,
            stray = params.stray,
            "synthesizing Stokes profiles"
        );

        if return_response {
            let (stokes, response) = self
                .engine
                .synthesize_with_response(&input)
                .map_err(|error| SirError::engine("ENGINE.SYNTHESIZE", error))?;
            self.check_stokes(&stokes)?;
            self.check_response(&response, depth_count)?;
            Ok(SynthesisOutput::SpectrumWithResponse { stokes, response })
        } else {
            let stokes = self
                .engine
                .synthesize(&input)
                .map_err(|error| SirError::engine("ENGINE.SYNTHESIZE", error))?;
            self.check_stokes(&stokes)?;
            Ok(SynthesisOutput::SpectrumOnly(stokes))
        }
    }

    fn check_stokes(&self, stokes: &StokesProfiles) -> SirResult<()> {
        let expected = (STOKES_ROWS, self.n_lambda);
        if stokes.shape() != expected {
            return Err(SirError::shape(
                "SHAPE.ENGINE_STOKES",
                format!(
                    "engine returned Stokes profiles of shape {:?}, expected {:?}",
                    stokes.shape(),
                    expected
                ),
            ));
        }
        Ok(())
    }

    fn check_response(&self, response: &ResponseFunctions, depth_count: usize) -> SirResult<()> {
        let expected = (STOKES_COMPONENTS, self.n_lambda, depth_count);
        for variable in ResponseVariable::ALL {
            let shape = response.get(variable).shape();
            if shape != expected {
                return Err(SirError::shape(
                    "SHAPE.ENGINE_RESPONSE",
                    format!(
                        "engine returned {variable} response of shape {shape:?}, expected {expected:?}"
                    ),
                ));
            }
        }

        let macroturbulence = response.macroturbulence();
        let shape = (macroturbulence.nrows(), macroturbulence.ncols());
        if shape != (STOKES_COMPONENTS, self.n_lambda) {
            return Err(SirError::shape(
                "SHAPE.ENGINE_RESPONSE",
                format!(
                    "engine returned macroturbulence response of shape {shape:?}, expected {:?}",
                    (STOKES_COMPONENTS, self.n_lambda)
                ),
            ));
        }
        Ok(())
    }
}
