use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{Context, Error};
use clap::{Parser, Subcommand};
use tracing::{error, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use rs_face_avatar::config::config::PipelineConfig;
use rs_face_avatar::utils::image::load_image_bytes;
use rs_face_avatar::{classify, AvatarPipeline, AvatarResult, LandmarkSet};

#[derive(Debug, Parser)]
#[command(name = "face-avatar", about = "Classify facial features and render an avatar")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the feature labels for a landmark dump.
    Classify {
        landmarks: PathBuf,
    },
    /// Classify a landmark dump and fetch its avatar.
    Avatar {
        landmarks: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run an image through the face-mesh service and fetch its avatar.
    Process {
        image: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Uses JSON output when `RUST_LOG_FORMAT=json`.
fn init_tracing() {
    let use_json = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

fn load_config(path: Option<&Path>, output: Option<PathBuf>) -> Result<PipelineConfig, Error> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::new(),
    };
    if let Some(output) = output {
        config.output_path = output;
    }
    Ok(config)
}

fn load_landmarks(path: &Path) -> Result<LandmarkSet, Error> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read landmarks {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid landmarks {}", path.display()))
}

async fn store(result: &AvatarResult, config: &PipelineConfig) -> Result<(), Error> {
    result.avatar.save(&config.output_path).await?;
    let response = result.to_response(config.output_path.display().to_string());
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode, Error> {
    match cli.command {
        Command::Classify { landmarks } => {
            let labels = classify(&load_landmarks(&landmarks)?)?;
            println!("{}", serde_json::to_string_pretty(&labels)?);
        }
        Command::Avatar { landmarks, config, output } => {
            let config = load_config(config.as_deref(), output)?;
            let pipeline = AvatarPipeline::from_config(&config)?;
            let result = pipeline.generate_from_landmarks(&load_landmarks(&landmarks)?).await?;
            store(&result, &config).await?;
        }
        Command::Process { image, config, output } => {
            let config = load_config(config.as_deref(), output)?;
            let pipeline = AvatarPipeline::from_config(&config)?;
            let im_bytes = load_image_bytes(&image).await?;
            match pipeline.process_image(&im_bytes).await? {
                Some(result) => store(&result, &config).await?,
                None => {
                    eprintln!("could not process image");
                    return Ok(ExitCode::FAILURE)
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "face-avatar failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
