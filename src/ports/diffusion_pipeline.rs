//! Diffusion pipeline port: a pretrained text-to-image pipeline with an
//! image-conditioning adapter, hosted outside this process.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Compute device the pipeline runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// NVIDIA GPU.
    Cuda,
    /// Host CPU.
    Cpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cuda => f.write_str("cuda"),
            Self::Cpu => f.write_str("cpu"),
        }
    }
}

/// Floating point precision the weights are loaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Half precision.
    Float16,
    /// Single precision.
    Float32,
}

/// Hardware reported by the pipeline host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceReport {
    /// Whether a CUDA device is usable.
    pub cuda_available: bool,
}

/// Opaque handle to a loaded pipeline instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineHandle {
    /// Server-assigned identifier.
    pub id: String,
}

/// Load a base model from pretrained weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Model repository (e.g., `"stabilityai/stable-diffusion-xl-base-1.0"`).
    pub model: String,
    /// Weight precision.
    pub torch_dtype: Precision,
    /// Weight variant (`"fp16"`), if any.
    pub variant: Option<String>,
    /// Load `.safetensors` weights only.
    pub use_safetensors: bool,
}

/// Attach IP-Adapter weights to a loaded pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterRequest {
    /// Adapter repository (e.g., `"h94/IP-Adapter"`).
    pub repository: String,
    /// Folder inside the repository.
    pub subfolder: String,
    /// Weight file name.
    pub weight_name: String,
    /// Image encoder folder, required by the ViT-H adapter variants.
    #[serde(default)]
    pub image_encoder_folder: Option<String>,
}

/// A single call into the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Scene description.
    pub prompt: String,
    /// Features to steer away from.
    pub negative_prompt: String,
    /// Denoising step count.
    pub num_inference_steps: u32,
    /// PNG-encoded reference image for the adapter.
    #[serde(default, with = "base64_bytes_opt")]
    pub ip_adapter_image: Option<Vec<u8>>,
    /// Seed for reproducible sampling.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// An encoded image produced by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Raw image bytes (decoded from base64).
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/png"`).
    pub mime_type: String,
}

/// Boxed future type returned by [`DiffusionPipeline`] methods.
pub type PipelineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PipelineError>> + Send + 'a>>;

/// A pretrained diffusion pipeline with IP-Adapter support.
///
/// The calls mirror the lifecycle of the hosted pipeline: load the base
/// model, attach and tune the adapter, move to a device, then generate.
pub trait DiffusionPipeline: Send + Sync {
    /// Report which devices the host can run on.
    fn probe(&self) -> PipelineFuture<'_, DeviceReport>;

    /// Load the base model.
    fn load(&self, request: &LoadRequest) -> PipelineFuture<'_, PipelineHandle>;

    /// Attach adapter weights to a loaded pipeline.
    fn load_ip_adapter(
        &self,
        handle: &PipelineHandle,
        request: &AdapterRequest,
    ) -> PipelineFuture<'_, ()>;

    /// Set the adapter conditioning strength.
    fn set_ip_adapter_scale(&self, handle: &PipelineHandle, scale: f32) -> PipelineFuture<'_, ()>;

    /// Move the pipeline to a device.
    fn to_device(&self, handle: &PipelineHandle, device: Device) -> PipelineFuture<'_, ()>;

    /// Run the pipeline once.
    fn generate(
        &self,
        handle: &PipelineHandle,
        request: &GenerateRequest,
    ) -> PipelineFuture<'_, GeneratedImage>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
pub(crate) mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Same as [`base64_bytes`], for optional payloads.
mod base64_bytes_opt {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match data {
            Some(bytes) => serializer
                .serialize_some(&base64::engine::general_purpose::STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| base64::engine::general_purpose::STANDARD.decode(&s))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Device::Cuda).unwrap(), "\"cuda\"");
        assert_eq!(serde_json::to_string(&Precision::Float16).unwrap(), "\"float16\"");
        assert_eq!(Device::Cpu.to_string(), "cpu");
    }

    #[test]
    fn generate_request_encodes_reference_as_base64() {
        let request = GenerateRequest {
            prompt: "a knight in a forest".into(),
            negative_prompt: "blurry".into(),
            num_inference_steps: 30,
            ip_adapter_image: Some(vec![0x89, 0x50, 0x4E, 0x47]),
            seed: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["ip_adapter_image"], "iVBORw==");

        let back: GenerateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back.ip_adapter_image, Some(vec![0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn generate_request_without_reference() {
        let json = serde_json::json!({
            "prompt": "a cat",
            "negative_prompt": "",
            "num_inference_steps": 1,
        });
        let request: GenerateRequest = serde_json::from_value(json).unwrap();
        assert!(request.ip_adapter_image.is_none());
        assert!(request.seed.is_none());
    }

    #[test]
    fn generated_image_base64_round_trip() {
        let image = GeneratedImage {
            data: vec![0xFF, 0xD8, 0xFF, 0xE0], // JPEG magic bytes
            mime_type: "image/jpeg".into(),
        };
        let json = serde_json::to_string(&image).unwrap();
        let deserialized: GeneratedImage = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.data, vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(deserialized.mime_type, "image/jpeg");
    }
}
