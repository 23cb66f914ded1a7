//! Replaying adapter for the `DiffusionPipeline` port.

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::PipelineError;
use crate::ports::{
    AdapterRequest, Device, DeviceReport, DiffusionPipeline, GenerateRequest, GeneratedImage,
    LoadRequest, PipelineFuture, PipelineHandle,
};

const PORT: &str = "diffusion_pipeline";

/// Serves recorded pipeline results from a cassette.
pub struct ReplayingDiffusionPipeline {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingDiffusionPipeline {
    /// Create a replaying pipeline backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }

    fn replay<T: DeserializeOwned + Send + 'static>(&self, method: &str) -> PipelineFuture<'_, T> {
        let result = next_output(&self.replayer, PORT, method).and_then(replay_result::<T>);
        Box::pin(async move { result.map_err(PipelineError::Replayed) })
    }
}

impl DiffusionPipeline for ReplayingDiffusionPipeline {
    fn probe(&self) -> PipelineFuture<'_, DeviceReport> {
        self.replay("probe")
    }

    fn load(&self, _request: &LoadRequest) -> PipelineFuture<'_, PipelineHandle> {
        self.replay("load")
    }

    fn load_ip_adapter(
        &self,
        _handle: &PipelineHandle,
        _request: &AdapterRequest,
    ) -> PipelineFuture<'_, ()> {
        self.replay("load_ip_adapter")
    }

    fn set_ip_adapter_scale(&self, _handle: &PipelineHandle, _scale: f32) -> PipelineFuture<'_, ()> {
        self.replay("set_ip_adapter_scale")
    }

    fn to_device(&self, _handle: &PipelineHandle, _device: Device) -> PipelineFuture<'_, ()> {
        self.replay("to_device")
    }

    fn generate(
        &self,
        _handle: &PipelineHandle,
        _request: &GenerateRequest,
    ) -> PipelineFuture<'_, GeneratedImage> {
        self.replay("generate")
    }
}
