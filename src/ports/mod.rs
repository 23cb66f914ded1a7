//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`.

pub mod diffusion_pipeline;

pub use diffusion_pipeline::{
    AdapterRequest, Device, DeviceReport, DiffusionPipeline, GenerateRequest, GeneratedImage,
    LoadRequest, PipelineFuture, PipelineHandle, Precision,
};
