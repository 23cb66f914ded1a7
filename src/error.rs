//! Error types for mnemosyne.
//!
//! Each CLI stage has its own variant in [`RunError`] so the user sees where
//! the run stopped.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the external diffusion pipeline or the transport to it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline server returned an error response.
    #[error("Pipeline error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body from the server.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with something we could not interpret.
    #[error("Unexpected pipeline response: {0}")]
    Protocol(String),

    /// The base model could not be loaded.
    #[error("Failed to load SDXL model: {0}")]
    ModelLoad(String),

    /// An error served from a replayed cassette.
    #[error("{0}")]
    Replayed(String),
}

/// Errors raised while reading the reference image.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// The path does not exist.
    #[error("Image not found at {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be opened or decoded.
    #[error("Failed to load image: {0}")]
    Decode(#[source] image::ImageError),

    /// The image could not be re-encoded for transport.
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Errors raised while writing the generated image.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output path has no extension we can map to an image format.
    #[error("Cannot determine image format from '{}'", .0.display())]
    UnknownFormat(PathBuf),

    /// Encoding or writing failed.
    #[error("{0}")]
    Image(#[from] image::ImageError),
}

/// Top-level error for a CLI run, one variant per stage.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The reference image could not be loaded.
    #[error("Error loading image: {0}")]
    LoadImage(#[source] ReferenceError),

    /// The pipeline could not be initialized.
    #[error("Error initializing generator: {0}")]
    Initialize(#[source] PipelineError),

    /// The pipeline failed while generating.
    #[error("Error during generation: {0}")]
    Generate(#[source] PipelineError),

    /// The result could not be written.
    #[error("Error saving output: {0}")]
    Save(#[source] OutputError),
}
