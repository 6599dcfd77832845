use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use elr_geocoder::config::{BuildConfig, ConfigError};
use elr_geocoder::export::{ExportError, calibration_rows, statistics_rows, write_csv};
use elr_geocoder::precompute::{PrecomputeError, precompute_all};
use elr_geocoder::registry::{Geocoder, LoadError};
use elr_geocoder::source::{SourceError, SurveySource};

#[derive(Debug, thiserror::Error)]
enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create output directory: {0}")]
    OutputDir(std::io::Error),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Precompute(#[from] PrecomputeError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "build failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BuildError> {
    let config = BuildConfig::from_env()?;
    std::fs::create_dir_all(&config.output_dir).map_err(BuildError::OutputDir)?;

    info!(source = %config.source_path.display(), "calibrating");
    let survey = SurveySource::load(&config.source_path)?.calibrate()?;
    write_csv(&config.calibration_csv(), &calibration_rows(&survey.lines))?;
    write_csv(&config.statistics_csv(), &statistics_rows(&survey.quality))?;
    info!(lines = survey.lines.len(), "wrote calibration tables");

    let geocoder = Geocoder::load_or_build(config.geocoder_config(), || Ok(survey.lines))?;
    info!(lines = geocoder.len(), metric = geocoder.metric_elrs().len(), "geocoder ready");

    let paths = precompute_all(
        &config.geocoder_config(),
        &config.output_dir,
        &config.resolutions,
    )
    .await?;
    info!(files = paths.len(), "precompute complete");

    Ok(())
}
