use super::CliError;
use super::helpers::{render_model_text, resolve_dir, write_stdout, write_text_output};
use serde::Serialize;
use sir_core::common::constants::LINE_DATABASE_FILE_NAME;
use sir_core::domain::SirError;
use sir_core::model::{load_model_config, normalize_model};
use sir_core::synthesis::{LineGrid, LineGroup, read_line_listing, write_line_listing};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(clap::Args)]
pub(super) struct LinesArgs {
    /// Directory holding the LINEAS database (defaults to the current directory)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Print the entries as a JSON array
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct GridArgs {
    /// Line group as INDICES:START,STEP,END in mA, e.g. "1,2:-500,10,1500"
    #[arg(long = "region", value_name = "GROUP", required = true)]
    regions: Vec<String>,

    /// Directory the malla.grid file is written to (defaults to the current directory)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Print a JSON summary instead of the line count
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct ModelArgs {
    /// JSON node configuration
    #[arg(long)]
    config: PathBuf,

    /// Output path (defaults to stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GridSummary {
    grid_file: PathBuf,
    groups: usize,
    n_lines: usize,
}

pub(super) fn run_lines_command(args: LinesArgs) -> Result<i32, CliError> {
    let dir = resolve_dir(args.dir)?;
    let entries = read_line_listing(&dir.join(LINE_DATABASE_FILE_NAME))?;
    debug!(entries = entries.len(), dir = %dir.display(), "read line database");

    let mut rendered = Vec::new();
    if args.json {
        serde_json::to_writer_pretty(&mut rendered, &entries)
            .map_err(|error| anyhow::anyhow!("failed to serialize line listing: {error}"))?;
        rendered.push(b'\n');
    } else {
        write_line_listing(&mut rendered, &entries)
            .map_err(|error| anyhow::anyhow!("failed to render line listing: {error}"))?;
    }
    write_stdout(&rendered)?;
    Ok(0)
}

pub(super) fn run_grid_command(args: GridArgs) -> Result<i32, CliError> {
    let groups = args
        .regions
        .iter()
        .map(|region| region.parse::<LineGroup>())
        .collect::<Result<Vec<_>, _>>()?;
    let grid = LineGrid::new(groups)?;

    let dir = resolve_dir(args.dir)?;
    let grid_file = grid.write_to(&dir)?;
    info!(
        groups = grid.groups().len(),
        n_lines = grid.line_count(),
        path = %grid_file.display(),
        "wrote line grid"
    );

    let rendered = if args.json {
        let summary = GridSummary {
            grid_file,
            groups: grid.groups().len(),
            n_lines: grid.line_count(),
        };
        let mut json = serde_json::to_string_pretty(&summary)
            .map_err(|error| anyhow::anyhow!("failed to serialize grid summary: {error}"))?;
        json.push('\n');
        json
    } else {
        format!("{}\n", grid.line_count())
    };
    write_stdout(rendered.as_bytes())?;
    Ok(0)
}

pub(super) fn run_model_command(args: ModelArgs) -> Result<i32, CliError> {
    let config = load_model_config(&args.config).map_err(SirError::from)?;
    let reduced = config.build()?;
    let model = normalize_model(&reduced, config.frame())?;
    info!(
        depths = model.nrows(),
        cartesian = config.cartesian,
        "built atmospheric model"
    );

    let rendered = render_model_text(&model);
    match args.output {
        Some(path) => write_text_output(&path, &rendered)?,
        None => write_stdout(rendered.as_bytes())?,
    }
    Ok(0)
}
