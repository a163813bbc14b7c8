use sir_core::domain::{FieldFrame, PhysicalChannel, ResponseVariable, SirErrorCategory};
use sir_core::model::{ChannelNodes, NodeSpec, assemble_model, build_model};
use sir_core::numerics::{DenseMatrix, linspace};
use sir_core::synthesis::{
    EngineError, LineGrid, LineGroup, Psf, ResponseCube, ResponseFunctions, Session,
    SessionOptions, StokesComponent, StokesProfiles, SynthesisEngine, SynthesisInput,
    SynthesisParams,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Engine double: wavelength grid from the line groups, Stokes I from the
/// temperature stratification and response cubes tagged with the variable index.
#[derive(Debug, Default)]
struct GridEngine {
    wavelengths: Vec<f64>,
    seen_grid_file: bool,
    seen_reference_files: bool,
    models: Vec<DenseMatrix>,
}

impl GridEngine {
    fn profiles(&self, input: &SynthesisInput<'_>) -> StokesProfiles {
        let mut stokes = StokesProfiles::zeros(self.wavelengths.len());
        let mean_t = (0..input.model.nrows())
            .map(|depth| input.model[(depth, 1)])
            .sum::<f64>()
            / input.model.nrows() as f64;
        let data = stokes.matrix_mut();
        for (k, wavelength) in self.wavelengths.iter().enumerate() {
            data[(0, k)] = *wavelength;
            data[(1, k)] = input.filling_factor * mean_t / 5000.0;
        }
        stokes
    }
}

impl SynthesisEngine for GridEngine {
    fn initialize(&mut self, grid: &LineGrid, working_dir: &Path) -> Result<usize, EngineError> {
        self.seen_grid_file = working_dir.join("malla.grid").is_file();
        self.seen_reference_files =
            working_dir.join("LINEAS").is_file() && working_dir.join("THEVENIN").is_file();
        self.wavelengths = grid
            .groups()
            .iter()
            .flat_map(|group| {
                let count = ((group.end() - group.start()) / group.step()).round() as usize + 1;
                (0..count).map(move |k| group.start() + k as f64 * group.step())
            })
            .collect();
        Ok(self.wavelengths.len())
    }

    fn set_psf(&mut self, _psf: &Psf) -> Result<(), EngineError> {
        Ok(())
    }

    fn synthesize(&mut self, input: &SynthesisInput<'_>) -> Result<StokesProfiles, EngineError> {
        self.models.push(input.model.clone());
        Ok(self.profiles(input))
    }

    fn synthesize_with_response(
        &mut self,
        input: &SynthesisInput<'_>,
    ) -> Result<(StokesProfiles, ResponseFunctions), EngineError> {
        self.models.push(input.model.clone());
        let n_lambda = self.wavelengths.len();
        let depths = input.model.nrows();
        let cubes = ResponseVariable::ALL
            .iter()
            .map(|variable| {
                let mut cube = ResponseCube::zeros(n_lambda, depths);
                cube.set(StokesComponent::I, 0, 0, variable.index() as f64);
                cube
            })
            .collect();
        let response = ResponseFunctions::new(cubes, DenseMatrix::zeros(4, n_lambda))
            .map_err(|error| EngineError::with_source("response assembly failed", error))?;
        Ok((self.profiles(input), response))
    }
}

fn data_dir() -> TempDir {
    let data = TempDir::new().expect("data dir");
    fs::write(
        data.path().join("LINEAS"),
        "1=FE 1 6301.5012 2.00 2.0 ...\n2=FE 1 6302.4936 2.00 2.0 ...\n3=FE 1 15648.515 ...\n4=FE 1 15652.874 ...\n---\n",
    )
    .expect("LINEAS");
    fs::write(data.path().join("THEVENIN"), "  1  H\n").expect("THEVENIN");
    data
}

fn open_session(groups: Vec<LineGroup>, data: &TempDir, work: &TempDir) -> Session<GridEngine> {
    let grid = LineGrid::new(groups).expect("grid");
    let options = SessionOptions::new(work.path()).with_data_dir(data.path());
    Session::initialize(GridEngine::default(), grid, options).expect("session")
}

fn quiet_sun_model(log_tau: &[f64]) -> DenseMatrix {
    let node_spec = NodeSpec::default()
        .with_channel(
            PhysicalChannel::Temperature,
            ChannelNodes::new([4500.0, 5500.0, 8000.0]),
        )
        .with_channel(PhysicalChannel::Microturbulence, ChannelNodes::new([1.0e5]))
        .with_channel(PhysicalChannel::Field, ChannelNodes::new([1500.0, 1000.0]))
        .with_channel(PhysicalChannel::Inclination, ChannelNodes::new([45.0]));
    let node_model = build_model(log_tau, &node_spec, FieldFrame::Spherical).expect("node model");
    assemble_model(log_tau, &node_model).expect("model")
}

#[test]
fn single_region_session_samples_two_hundred_and_one_wavelengths() {
    let data = data_dir();
    let work = TempDir::new().expect("work dir");
    let session = open_session(
        vec![LineGroup::new("1", -500.0, 10.0, 1500.0).expect("group")],
        &data,
        &work,
    );

    assert_eq!(session.n_lines(), 1);
    assert_eq!(session.n_lambda(), 201);
    assert!(session.engine().seen_grid_file);
    assert!(session.engine().seen_reference_files);

    let grid = fs::read_to_string(work.path().join("malla.grid")).expect("grid file");
    let lines: Vec<&str> = grid.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[7], "1    :  -500.0, 10.0, 1500.0");
}

#[test]
fn blended_regions_count_every_line() {
    let data = data_dir();
    let work = TempDir::new().expect("work dir");
    let session = open_session(
        vec![
            "1:-500,10,1500".parse().expect("group"),
            "2,3,4:-750,10,1300".parse().expect("group"),
        ],
        &data,
        &work,
    );

    assert_eq!(session.n_lines(), 4);
    assert_eq!(session.n_lambda(), 201 + 206);
    assert_eq!(session.list_lines().expect("listing").len(), 4);
}

#[test]
fn built_model_synthesizes_with_response_functions() {
    let data = data_dir();
    let work = TempDir::new().expect("work dir");
    let mut session = open_session(
        vec![LineGroup::new("1", -500.0, 10.0, 1500.0).expect("group")],
        &data,
        &work,
    );

    let log_tau = linspace(-4.0, 1.0, 51);
    let model = quiet_sun_model(&log_tau);
    assert_eq!((model.nrows(), model.ncols()), (51, 7));

    let (stokes, response) = session
        .synthesize(&model, &SynthesisParams::default())
        .expect("synthesis")
        .into_parts();
    let response = response.expect("response functions requested by default");

    assert_eq!(stokes.shape(), (5, 201));
    assert_eq!(stokes.wavelengths()[0], -500.0);
    assert_eq!(stokes.wavelengths()[200], 1500.0);
    for variable in ResponseVariable::ALL {
        let cube = response.get(variable);
        assert_eq!(cube.shape(), (4, 201, 51));
        assert_eq!(cube.get(StokesComponent::I, 0, 0), variable.index() as f64);
    }
    assert_eq!(
        (response.macroturbulence().nrows(), response.macroturbulence().ncols()),
        (4, 201)
    );

    let seen = session.engine().models.last().expect("engine saw a model");
    assert_eq!(seen.ncols(), 8);
    assert!((seen[(0, 1)] - 4500.0).abs() < 1.0e-6);
    assert!((seen[(50, 1)] - 8000.0).abs() < 1.0e-6);
    assert_eq!(seen[(49, 2)], -1.0);
    assert_eq!(seen[(50, 2)], 1.11634e-01);
}

#[test]
fn spectrum_only_output_has_no_response_functions() {
    let data = data_dir();
    let work = TempDir::new().expect("work dir");
    let mut session = open_session(
        vec![LineGroup::new("1", -500.0, 10.0, 1500.0).expect("group")],
        &data,
        &work,
    );

    let log_tau = linspace(-4.0, 1.0, 11);
    let params = SynthesisParams::default()
        .with_response(false)
        .with_filling_factor(0.5);
    let output = session
        .synthesize(&quiet_sun_model(&log_tau), &params)
        .expect("synthesis");

    assert!(output.response().is_none());
    assert_eq!(output.stokes().shape(), (5, 201));
}

#[test]
fn existing_reference_files_are_kept() {
    let data = data_dir();
    let work = TempDir::new().expect("work dir");
    fs::write(work.path().join("LINEAS"), "7=TI 1 ...\n---\n").expect("local LINEAS");

    let session = open_session(
        vec![LineGroup::new("7", -300.0, 15.0, 300.0).expect("group")],
        &data,
        &work,
    );
    assert_eq!(session.list_lines().expect("listing"), vec!["7=TI 1 ...".to_string()]);
}

#[test]
fn malformed_model_is_rejected_before_the_engine_runs() {
    let data = data_dir();
    let work = TempDir::new().expect("work dir");
    let mut session = open_session(
        vec![LineGroup::new("1", -500.0, 10.0, 1500.0).expect("group")],
        &data,
        &work,
    );

    let error = session
        .synthesize(&DenseMatrix::zeros(10, 6), &SynthesisParams::default())
        .expect_err("six columns");
    assert_eq!(error.category(), SirErrorCategory::ShapeError);
    assert_eq!(
        error.diagnostic_line(),
        format!("ERROR: [SHAPE.MODEL_COLUMNS] {}", error.message())
    );
    assert!(session.engine().models.is_empty());
}

#[test]
fn missing_bundled_data_fails_initialization() {
    let empty = TempDir::new().expect("empty data dir");
    let work = TempDir::new().expect("work dir");
    let grid = LineGrid::new(vec![LineGroup::new("1", -500.0, 10.0, 1500.0).expect("group")])
        .expect("grid");
    let options = SessionOptions::new(work.path()).with_data_dir(empty.path());

    let error = Session::initialize(GridEngine::default(), grid, options).expect_err("no data");
    assert_eq!(error.category(), SirErrorCategory::IoSystemError);
    assert_eq!(error.exit_code(), 6);
}

#[test]
fn absent_data_directory_points_at_the_environment_variable() {
    let work = TempDir::new().expect("work dir");
    let grid = LineGrid::new(vec![LineGroup::new("1", -500.0, 10.0, 1500.0).expect("group")])
        .expect("grid");
    let options = SessionOptions::new(work.path()).with_data_dir(work.path().join("data"));

    let error = Session::initialize(GridEngine::default(), grid, options).expect_err("no data dir");
    assert_eq!(error.placeholder(), "IO.DATA_DIR");
    assert!(error.message().contains("SIR_DATA_DIR"));
}
