//! CLI argument parsing with clap.

use clap::Parser;

/// Mnemosyne prototype: generate a scene that keeps a reference character's identity.
#[derive(Parser, Debug)]
#[command(name = "mnemosyne", version, about)]
pub struct Cli {
    /// Text description of the scene.
    #[arg(long)]
    pub prompt: String,

    /// Path to the reference character image.
    #[arg(long, alias = "image_path")]
    pub image_path: String,

    /// Path to save the generated image.
    #[arg(short, long, default_value = "output.png")]
    pub output: String,

    /// Number of inference steps [default: 30, or from config].
    #[arg(long)]
    pub steps: Option<u32>,

    /// Reference conditioning strength, 0.0 to 1.0 [default: 0.6, or from config].
    #[arg(long)]
    pub scale: Option<f32>,

    /// IP-Adapter weight alias (sdxl, sdxl-vit-h, plus, plus-face) or file name.
    #[arg(long)]
    pub adapter: Option<String>,

    /// Preferred device: cuda or cpu. CUDA falls back to CPU when unavailable.
    #[arg(long)]
    pub device: Option<String>,

    /// Seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}
