//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::model::SDXL_BASE;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the pipeline is hosted.
    pub pipeline: PipelineConfig,
    /// Base model selection.
    pub model: ModelConfig,
    /// IP-Adapter settings.
    pub adapter: AdapterConfig,
    /// Generation defaults (used when CLI flags are absent).
    pub generation: GenerationConfig,
}

/// Pipeline host settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base URL of the pipeline server.
    pub endpoint: String,
    /// Bearer token, if the server requires one.
    pub token: Option<String>,
    /// Per-request timeout. Model loading and generation are slow.
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { endpoint: "http://127.0.0.1:7860".to_string(), token: None, timeout_secs: 600 }
    }
}

/// Base model settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Pretrained model repository.
    pub base: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { base: SDXL_BASE.to_string() }
    }
}

/// IP-Adapter settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Load the adapter at all.
    pub enabled: bool,
    /// Weight alias or exact file name.
    pub name: String,
    /// Conditioning strength.
    pub scale: f32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self { enabled: true, name: "sdxl".to_string(), scale: 0.6 }
    }
}

/// Generation defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Inference steps.
    pub steps: u32,
    /// Negative prompt sent with every request.
    pub negative_prompt: String,
    /// Preferred device.
    pub device: String,
    /// Reference images whose shorter side exceeds this are downscaled.
    pub reference_size: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            steps: 30,
            negative_prompt: "blurry, low quality, distortion, deformed".to_string(),
            device: "cuda".to_string(),
            reference_size: 1024,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Pipeline endpoint, preferring `MNEMOSYNE_PIPELINE_URL`.
    #[must_use]
    pub fn pipeline_endpoint(&self) -> String {
        std::env::var("MNEMOSYNE_PIPELINE_URL").unwrap_or_else(|_| self.pipeline.endpoint.clone())
    }

    /// Pipeline token, preferring `MNEMOSYNE_PIPELINE_TOKEN`.
    #[must_use]
    pub fn pipeline_token(&self) -> Option<String> {
        std::env::var("MNEMOSYNE_PIPELINE_TOKEN").ok().or_else(|| self.pipeline.token.clone())
    }

    /// Per-request timeout.
    #[must_use]
    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.timeout_secs)
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `MNEMOSYNE_CONFIG` environment variable
/// 3. `~/.config/mnemosyne/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("MNEMOSYNE_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/mnemosyne/config.toml")
    } else {
        PathBuf::from("mnemosyne.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.pipeline.endpoint, "http://127.0.0.1:7860");
        assert_eq!(config.model.base, "stabilityai/stable-diffusion-xl-base-1.0");
        assert!(config.adapter.enabled);
        assert_eq!(config.adapter.name, "sdxl");
        assert!((config.adapter.scale - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.generation.steps, 30);
        assert_eq!(config.generation.negative_prompt, "blurry, low quality, distortion, deformed");
        assert_eq!(config.generation.device, "cuda");
        assert_eq!(config.generation.reference_size, 1024);
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.generation.steps, 30);
    }

    #[test]
    fn load_partial_toml_keeps_other_defaults() {
        let dir = std::env::temp_dir().join("mnemosyne_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[pipeline]
endpoint = "http://gpu-box:9000"
timeout_secs = 120

[adapter]
name = "plus-face"
scale = 0.8

[generation]
steps = 50
device = "cpu"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.pipeline.endpoint, "http://gpu-box:9000");
        assert_eq!(config.pipeline_timeout(), Duration::from_secs(120));
        assert!(config.pipeline.token.is_none());
        assert_eq!(config.adapter.name, "plus-face");
        assert!(config.adapter.enabled);
        assert_eq!(config.generation.steps, 50);
        assert_eq!(config.generation.device, "cpu");
        assert_eq!(config.generation.reference_size, 1024);
        assert_eq!(config.model.base, "stabilityai/stable-diffusion-xl-base-1.0");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = std::env::temp_dir().join("mnemosyne_config_bad_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn token_from_file_without_env() {
        let config = Config {
            pipeline: PipelineConfig { token: Some("from-file".into()), ..PipelineConfig::default() },
            ..Config::default()
        };
        if std::env::var("MNEMOSYNE_PIPELINE_TOKEN").is_err() {
            assert_eq!(config.pipeline_token().as_deref(), Some("from-file"));
        }
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
