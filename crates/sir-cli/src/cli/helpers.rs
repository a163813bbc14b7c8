use super::CliError;
use anyhow::Context;
use sir_core::domain::SirError;
use sir_core::numerics::DenseMatrix;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Installs the stderr subscriber once; later calls keep the first filter.
pub(super) fn init_logging(directive: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(directive))
        .with_writer(std::io::stderr)
        .try_init();
}

/// `--log-level` wins over `RUST_LOG`; an unparsable filter falls back to `warn`.
fn log_filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(directive) => EnvFilter::try_new(directive).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

pub(super) fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().map_err(|source| {
            CliError::Compute(SirError::io_system(
                "IO.CLI_CURRENT_DIR",
                format!("failed to read current working directory: {}", source),
            ))
        }),
    }
}

pub(super) fn write_stdout(bytes: &[u8]) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")?;
    Ok(())
}

pub(super) fn write_text_output(path: &Path, content: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| {
            CliError::Compute(SirError::io_system(
                "IO.CLI_OUTPUT",
                format!(
                    "failed to create output directory '{}': {}",
                    parent.display(),
                    source
                ),
            ))
        })?;
    }
    fs::write(path, content).map_err(|source| {
        CliError::Compute(SirError::io_system(
            "IO.CLI_OUTPUT",
            format!("failed to write '{}': {}", path.display(), source),
        ))
    })
}

/// Depth count on the first line, then one whitespace-separated row per depth.
pub(super) fn render_model_text(model: &DenseMatrix) -> String {
    let mut rendered = format!("{}\n", model.nrows());
    for row in 0..model.nrows() {
        let fields: Vec<String> = (0..model.ncols())
            .map(|col| format!("{:>14.6e}", model[(row, col)]))
            .collect();
        rendered.push_str(&fields.join(" "));
        rendered.push('\n');
    }
    rendered
}
