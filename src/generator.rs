//! Character-consistent generator: owns a loaded pipeline and forwards
//! generation calls to it.

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::params::{precision_for, resolve_device};
use crate::ports::{
    AdapterRequest, Device, DiffusionPipeline, GenerateRequest, LoadRequest, PipelineHandle,
};
use crate::reference::encode_png;

/// How to bring the pipeline up.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Pretrained base model.
    pub model: String,
    /// Adapter weights, or `None` to run plain SDXL.
    pub adapter: Option<AdapterRequest>,
    /// Conditioning strength applied after the adapter loads.
    pub scale: f32,
    /// Device to use when the host supports it.
    pub preferred_device: Device,
    /// Negative prompt sent with every request.
    pub negative_prompt: String,
}

/// SDXL pipeline with an optional IP-Adapter, ready to generate.
pub struct CharacterGenerator {
    pipeline: Box<dyn DiffusionPipeline>,
    handle: PipelineHandle,
    device: Device,
    adapter_active: bool,
    negative_prompt: String,
}

impl CharacterGenerator {
    /// Load the base model, attach the adapter and move to the device.
    ///
    /// An adapter that fails to load or tune is not fatal: the generator
    /// falls back to the base model without character consistency.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be reached, the base model fails
    /// to load, or the pipeline cannot be moved to the device.
    pub async fn initialize(
        pipeline: Box<dyn DiffusionPipeline>,
        settings: GeneratorSettings,
    ) -> Result<Self, PipelineError> {
        let report = pipeline.probe().await?;
        let device = resolve_device(settings.preferred_device, report.cuda_available);
        info!("Initializing generator on {device}");

        let (torch_dtype, variant) = precision_for(device);
        let load = LoadRequest {
            model: settings.model.clone(),
            torch_dtype,
            variant: variant.map(str::to_string),
            use_safetensors: true,
        };
        let handle = pipeline
            .load(&load)
            .await
            .map_err(|e| PipelineError::ModelLoad(e.to_string()))?;
        debug!(handle = %handle.id, model = %settings.model, "base model loaded");

        let adapter_active = match settings.adapter {
            Some(ref adapter) => {
                match attach_adapter(pipeline.as_ref(), &handle, adapter, settings.scale).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            "Could not load IP-Adapter ({e}). Falling back to standard SDXL \
                             (no character consistency)"
                        );
                        false
                    }
                }
            }
            None => {
                info!("IP-Adapter disabled; running standard SDXL");
                false
            }
        };

        pipeline.to_device(&handle, device).await?;

        Ok(Self {
            pipeline,
            handle,
            device,
            adapter_active,
            negative_prompt: settings.negative_prompt,
        })
    }

    /// Device the pipeline ended up on.
    #[must_use]
    pub fn device(&self) -> Device {
        self.device
    }

    /// Whether the reference image will condition the output.
    #[must_use]
    pub fn adapter_active(&self) -> bool {
        self.adapter_active
    }

    /// Generate one image for `prompt`, conditioned on `reference`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline call fails or its output cannot be
    /// decoded.
    pub async fn generate(
        &self,
        prompt: &str,
        reference: &DynamicImage,
        num_inference_steps: u32,
        seed: Option<u64>,
    ) -> Result<DynamicImage, PipelineError> {
        info!("Generating image for prompt: '{prompt}'");

        // A pipeline without the adapter rejects an adapter image.
        let ip_adapter_image = if self.adapter_active {
            Some(encode_png(reference).map_err(|e| PipelineError::Protocol(e.to_string()))?)
        } else {
            None
        };

        let request = GenerateRequest {
            prompt: prompt.to_string(),
            negative_prompt: self.negative_prompt.clone(),
            num_inference_steps,
            ip_adapter_image,
            seed,
        };
        let generated = self.pipeline.generate(&self.handle, &request).await?;
        debug!(mime_type = %generated.mime_type, bytes = generated.data.len(), "image received");

        image::load_from_memory(&generated.data)
            .map_err(|e| PipelineError::Protocol(format!("Failed to decode generated image: {e}")))
    }
}

async fn attach_adapter(
    pipeline: &dyn DiffusionPipeline,
    handle: &PipelineHandle,
    adapter: &AdapterRequest,
    scale: f32,
) -> Result<(), PipelineError> {
    pipeline.load_ip_adapter(handle, adapter).await?;
    pipeline.set_ip_adapter_scale(handle, scale).await
}
