pub mod engine;
pub mod line_grid;
pub mod reference;
pub mod session;

pub use engine::{
    DepartureCoefficients, EngineError, Psf, ResponseCube, ResponseFunctions, StokesComponent,
    StokesProfiles, SynthesisEngine, SynthesisInput,
};
pub use line_grid::{LineGrid, LineGroup};
pub use reference::{
    REFERENCE_FILES, default_data_dir, ensure_reference_files, read_line_listing,
    write_line_listing,
};
pub use session::{Session, SessionOptions, SynthesisOutput, SynthesisParams};
