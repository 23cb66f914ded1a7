//! Parameter validation and device/precision selection.

use crate::ports::{Device, Precision};

/// Validate the scene prompt.
///
/// # Errors
///
/// Returns an error if the prompt is empty or only whitespace.
pub fn validate_prompt(prompt: &str) -> Result<(), String> {
    if prompt.trim().is_empty() {
        Err("Prompt must not be empty".to_string())
    } else {
        Ok(())
    }
}

/// Validate the inference step count.
///
/// # Errors
///
/// Returns an error if the count is zero.
pub fn validate_steps(steps: u32) -> Result<(), String> {
    if steps == 0 {
        Err("Steps must be at least 1".to_string())
    } else {
        Ok(())
    }
}

/// Validate the adapter conditioning strength.
///
/// # Errors
///
/// Returns an error if the scale is not a finite value in `[0.0, 1.0]`.
pub fn validate_scale(scale: f32) -> Result<(), String> {
    if scale.is_finite() && (0.0..=1.0).contains(&scale) {
        Ok(())
    } else {
        Err(format!("Unsupported scale '{scale}'. Valid: 0.0 to 1.0"))
    }
}

/// Parse a device name.
///
/// # Errors
///
/// Returns an error if the name is not recognized.
pub fn parse_device(name: &str) -> Result<Device, String> {
    match name.to_ascii_lowercase().as_str() {
        "cuda" | "gpu" => Ok(Device::Cuda),
        "cpu" => Ok(Device::Cpu),
        _ => Err(format!("Unsupported device '{name}'. Valid: cuda, cpu")),
    }
}

/// Pick the device to run on: CUDA only when preferred and available.
#[must_use]
pub fn resolve_device(preferred: Device, cuda_available: bool) -> Device {
    match preferred {
        Device::Cuda if cuda_available => Device::Cuda,
        _ => Device::Cpu,
    }
}

/// Weight precision and variant for a device. Half precision needs a GPU.
#[must_use]
pub fn precision_for(device: Device) -> (Precision, Option<&'static str>) {
    match device {
        Device::Cuda => (Precision::Float16, Some("fp16")),
        Device::Cpu => (Precision::Float32, None),
    }
}
