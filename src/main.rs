//! `lungai` command-line client.
//!
//! # Commands
//! ```text
//! lungai probe                 wake the backend, print every attempt
//! lungai analyze <IMAGE>       wake in background, upload, print findings
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use lungai::config::{load_config, validate_config, ClientConfig, ConfigError};
use lungai::health::BackendProber;
use lungai::observability::logging::init_logging;
use lungai::render::{export_results, ErrorPanel, ResultsView};
use lungai::session::{AnalysisSession, IgnoreReason, PreviewStore, SelectedImage, Selection, SessionPhase};
use lungai::InferenceClient;

#[derive(Parser)]
#[command(name = "lungai")]
#[command(about = "Chest X-ray analysis client for the LungAI inference API", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override backend.base_url
    #[arg(short = 'u', long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wake the backend and report each attempt
    Probe {
        /// Override probe.max_attempts
        #[arg(long)]
        attempts: Option<u32>,

        /// Override probe.timeout_ms
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Upload a chest X-ray and print the findings
    Analyze {
        /// Image file (png, jpg, ...)
        image: PathBuf,

        /// Write the original and overlay images here
        #[arg(long)]
        save_dir: Option<PathBuf>,

        /// Skip the background wake-up probe
        #[arg(long)]
        no_probe: bool,
    },
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.clone();
    }
    if let Commands::Probe { attempts, timeout_ms } = &cli.command {
        if let Some(n) = attempts {
            config.probe.max_attempts = *n;
        }
        if let Some(ms) = timeout_ms {
            config.probe.timeout_ms = *ms;
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(&config.observability);

    tracing::debug!(backend = %config.backend.base_url, "Configuration loaded");

    let client = InferenceClient::new(&config.backend, &config.analyze)?;

    match cli.command {
        Commands::Probe { .. } => probe(client, &config).await,
        Commands::Analyze { image, save_dir, no_probe } => {
            if !no_probe {
                // Fire-and-forget: the upload below never waits on it.
                BackendProber::new(client.clone(), config.probe.clone()).spawn();
            }
            analyze(&client, &config, &image, save_dir.as_deref()).await
        }
    }
}

async fn probe(client: InferenceClient, config: &ClientConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let url = client.base_url().to_string();
    let report = BackendProber::new(client, config.probe.clone()).run().await;

    for attempt in &report.attempts {
        println!(
            "attempt {}/{}: {} ({} ms)",
            attempt.ordinal,
            config.probe.max_attempts,
            attempt.outcome,
            attempt.elapsed.as_millis()
        );
    }

    if report.awake {
        println!("{} is awake", url);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} did not wake up after {} attempts", url, report.attempts.len());
        Ok(ExitCode::FAILURE)
    }
}

async fn analyze(
    client: &InferenceClient,
    config: &ClientConfig,
    path: &Path,
    save_dir: Option<&Path>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut session = AnalysisSession::new(PreviewStore::new(), config.analyze.max_upload_bytes);
    let image = SelectedImage::load(path).await?;

    if let Selection::Ignored(reason) = session.select_file(image)? {
        match reason {
            IgnoreReason::NotAnImage { media_type } => {
                eprintln!("{} is not an image ({}); nothing to analyze", path.display(), media_type)
            }
            IgnoreReason::TooLarge { bytes, limit } => {
                eprintln!("{} is {} bytes, above the {} byte limit", path.display(), bytes, limit)
            }
        }
        return Ok(ExitCode::from(2));
    }

    println!("Analyzing {} ...", path.display());
    let phase = session.analyze(client).await?;

    let code = match phase {
        SessionPhase::Results => {
            let result = session.result().ok_or("results missing after analysis")?;
            println!("{}", ResultsView::new(result));
            if let Some(dir) = save_dir {
                let files = export_results(result, dir, chrono::Local::now().date_naive())?;
                println!("Saved {}", files.original.display());
                for overlay in &files.overlays {
                    println!("Saved {}", overlay.display());
                }
            }
            ExitCode::SUCCESS
        }
        _ => {
            if let Some(error) = session.error() {
                eprintln!("{}", ErrorPanel(error));
            }
            ExitCode::FAILURE
        }
    };

    session.reset();
    Ok(code)
}
