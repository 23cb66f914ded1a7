//! Recording adapter for the `DiffusionPipeline` port.

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{
    AdapterRequest, Device, DeviceReport, DiffusionPipeline, GenerateRequest, GeneratedImage,
    LoadRequest, PipelineFuture, PipelineHandle,
};

const PORT: &str = "diffusion_pipeline";

/// Records pipeline interactions while delegating to an inner implementation.
pub struct RecordingDiffusionPipeline {
    inner: Box<dyn DiffusionPipeline>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingDiffusionPipeline {
    /// Wrap `inner`, writing every call to `recorder`.
    pub fn new(inner: Box<dyn DiffusionPipeline>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl DiffusionPipeline for RecordingDiffusionPipeline {
    fn probe(&self) -> PipelineFuture<'_, DeviceReport> {
        Box::pin(async move {
            let result = self.inner.probe().await;
            record_result(&self.recorder, PORT, "probe", &(), &result);
            result
        })
    }

    fn load(&self, request: &LoadRequest) -> PipelineFuture<'_, PipelineHandle> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.load(&request).await;
            record_result(&self.recorder, PORT, "load", &request, &result);
            result
        })
    }

    fn load_ip_adapter(
        &self,
        handle: &PipelineHandle,
        request: &AdapterRequest,
    ) -> PipelineFuture<'_, ()> {
        let handle = handle.clone();
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.load_ip_adapter(&handle, &request).await;
            let input = json!({ "handle": handle, "request": request });
            record_result(&self.recorder, PORT, "load_ip_adapter", &input, &result);
            result
        })
    }

    fn set_ip_adapter_scale(&self, handle: &PipelineHandle, scale: f32) -> PipelineFuture<'_, ()> {
        let handle = handle.clone();
        Box::pin(async move {
            let result = self.inner.set_ip_adapter_scale(&handle, scale).await;
            let input = json!({ "handle": handle, "scale": scale });
            record_result(&self.recorder, PORT, "set_ip_adapter_scale", &input, &result);
            result
        })
    }

    fn to_device(&self, handle: &PipelineHandle, device: Device) -> PipelineFuture<'_, ()> {
        let handle = handle.clone();
        Box::pin(async move {
            let result = self.inner.to_device(&handle, device).await;
            let input = json!({ "handle": handle, "device": device });
            record_result(&self.recorder, PORT, "to_device", &input, &result);
            result
        })
    }

    fn generate(
        &self,
        handle: &PipelineHandle,
        request: &GenerateRequest,
    ) -> PipelineFuture<'_, GeneratedImage> {
        let handle = handle.clone();
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.generate(&handle, &request).await;
            let input = json!({ "handle": handle, "request": request });
            record_result(&self.recorder, PORT, "generate", &input, &result);
            result
        })
    }
}
