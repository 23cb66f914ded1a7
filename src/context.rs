//! Service context that picks the pipeline adapter for this run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::adapters::live::pipeline_server::PipelineServerClient;
use crate::adapters::recording::diffusion_pipeline::RecordingDiffusionPipeline;
use crate::adapters::replaying::diffusion_pipeline::ReplayingDiffusionPipeline;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::Config;
use crate::error::PipelineError;
use crate::ports::DiffusionPipeline;

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Diffusion pipeline port.
    pub pipeline: Box<dyn DiffusionPipeline>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette to disk.
    ///
    /// Call this after every adapter holding the recorder has been dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        debug!(interactions = recorder.interactions().len(), "writing cassette");
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context talking to the configured pipeline server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn live(config: &Config) -> Result<Self, PipelineError> {
        let client = PipelineServerClient::new(
            &config.pipeline_endpoint(),
            config.pipeline_token(),
            config.pipeline_timeout(),
        )?;
        Ok(Self { pipeline: Box::new(client) })
    }

    /// Create a recording context that wraps the live adapter with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live adapter cannot be created.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), PipelineError> {
        let live_ctx = Self::live(config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".mnemosyne/cassettes")
            .join(&timestamp)
            .join("diffusion_pipeline.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-diffusion_pipeline"),
            get_commit_hash(),
        )));

        let pipeline = RecordingDiffusionPipeline::new(live_ctx.pipeline, Arc::clone(&recorder));

        Ok((Self { pipeline: Box::new(pipeline) }, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let replayer = load_cassette(path)?;
        let pipeline = ReplayingDiffusionPipeline::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { pipeline: Box::new(pipeline) })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
