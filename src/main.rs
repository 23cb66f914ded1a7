//! Mnemosyne - character-consistent image generation CLI.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod error;
mod generator;
mod model;
mod output;
mod params;
mod ports;
mod reference;

use std::io::IsTerminal;
use std::path::Path;
use std::process;

use clap::Parser;
use image::DynamicImage;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;
use crate::context::{RecordingSession, ServiceContext};
use crate::error::RunError;
use crate::generator::{CharacterGenerator, GeneratorSettings};
use crate::model::resolve_adapter;
use crate::output::{display_path, save_image};
use crate::params::{parse_device, validate_prompt, validate_scale, validate_steps};
use crate::reference::{load_image, preprocess_image};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{e}");
        process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), RunError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(RunError::Config)?;
    debug!(path = %config_path.display(), "config loaded");

    println!("--- Mnemosyne Prototype ---");
    println!("Reference Image: {}", cli.image_path);
    println!("Scene Prompt:    {}", cli.prompt);

    let steps = cli.steps.unwrap_or(config.generation.steps);
    let scale = cli.scale.unwrap_or(config.adapter.scale);
    let device = cli.device.as_deref().unwrap_or(&config.generation.device);

    validate_prompt(&cli.prompt).map_err(RunError::InvalidArgument)?;
    validate_steps(steps).map_err(RunError::InvalidArgument)?;
    validate_scale(scale).map_err(RunError::InvalidArgument)?;
    let preferred_device = parse_device(device).map_err(RunError::InvalidArgument)?;

    // 1. Reference image
    info!("Loading reference image...");
    let reference = load_image(Path::new(&cli.image_path)).map_err(RunError::LoadImage)?;
    let reference = preprocess_image(reference, config.generation.reference_size);

    // 2-4. Generator, generation, output
    let (ctx, recording_session) = service_context(&config)?;
    let adapter = if config.adapter.enabled {
        Some(resolve_adapter(cli.adapter.as_deref().unwrap_or(&config.adapter.name)))
    } else {
        None
    };
    let settings = GeneratorSettings {
        model: config.model.base.clone(),
        adapter,
        scale,
        preferred_device,
        negative_prompt: config.generation.negative_prompt.clone(),
    };
    let result = generate_and_save(ctx, settings, &cli, &reference, steps).await;

    // Failed runs are recorded too.
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => info!("Cassette saved: {}", path.display()),
            Err(e) => warn!("Failed to save cassette: {e}"),
        }
    }

    result
}

/// Everything that touches the pipeline. The context is consumed, so a
/// recording session can be finished once this returns.
async fn generate_and_save(
    ctx: ServiceContext,
    settings: GeneratorSettings,
    cli: &Cli,
    reference: &DynamicImage,
    steps: u32,
) -> Result<(), RunError> {
    let generator =
        CharacterGenerator::initialize(ctx.pipeline, settings).await.map_err(RunError::Initialize)?;
    debug!(device = %generator.device(), adapter = generator.adapter_active(), "generator ready");

    info!("Starting generation process...");
    let generated = generator
        .generate(&cli.prompt, reference, steps, cli.seed)
        .await
        .map_err(RunError::Generate)?;
    drop(generator);

    let output_path = Path::new(&cli.output);
    save_image(&generated, output_path).map_err(RunError::Save)?;
    println!("\nSuccess! Generated image saved to: {}", display_path(output_path).display());
    Ok(())
}

/// Live, recording (`MNEMOSYNE_REC`) or replaying (`MNEMOSYNE_REPLAY`) context.
fn service_context(
    config: &Config,
) -> Result<(ServiceContext, Option<RecordingSession>), RunError> {
    if let Ok(cassette_path) = std::env::var("MNEMOSYNE_REPLAY") {
        debug!("Replaying from: {cassette_path}");
        let ctx = ServiceContext::replaying(Path::new(&cassette_path)).map_err(RunError::Config)?;
        return Ok((ctx, None));
    }

    if std::env::var("MNEMOSYNE_REC").is_ok_and(|v| v == "true" || v == "1") {
        debug!("Recording mode enabled");
        let (ctx, session) = ServiceContext::recording(config).map_err(RunError::Initialize)?;
        return Ok((ctx, Some(session)));
    }

    Ok((ServiceContext::live(config).map_err(RunError::Initialize)?, None))
}
