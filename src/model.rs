//! Pretrained weight identifiers and adapter alias resolution.

use crate::ports::AdapterRequest;

/// Default base model.
pub const SDXL_BASE: &str = "stabilityai/stable-diffusion-xl-base-1.0";

/// Repository hosting the IP-Adapter weights.
pub const IP_ADAPTER_REPO: &str = "h94/IP-Adapter";

/// Folder holding the SDXL adapter weights.
pub const IP_ADAPTER_SUBFOLDER: &str = "sdxl_models";

/// Image encoder used by the ViT-H adapter variants.
const VIT_H_ENCODER: &str = "models/image_encoder";

/// Short names for the SDXL adapter weights: (alias, weight file, needs ViT-H encoder).
const ALIASES: &[(&str, &str, bool)] = &[
    ("sdxl", "ip-adapter_sdxl.bin", false),
    ("sdxl-vit-h", "ip-adapter_sdxl_vit-h.safetensors", true),
    ("plus", "ip-adapter-plus_sdxl_vit-h.safetensors", true),
    ("plus-face", "ip-adapter-plus-face_sdxl_vit-h.safetensors", true),
];

/// Resolve an adapter alias (or exact weight file name) into a load request.
///
/// Exact file names containing `vit-h` get the ViT-H image encoder.
#[must_use]
pub fn resolve_adapter(name: &str) -> AdapterRequest {
    let (weight_name, vit_h) = ALIASES
        .iter()
        .find(|&&(alias, _, _)| alias == name)
        .map_or_else(|| (name.to_string(), name.contains("vit-h")), |&(_, w, v)| (w.to_string(), v));

    AdapterRequest {
        repository: IP_ADAPTER_REPO.to_string(),
        subfolder: IP_ADAPTER_SUBFOLDER.to_string(),
        weight_name,
        image_encoder_folder: vit_h.then(|| VIT_H_ENCODER.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_default_alias() {
        let r = resolve_adapter("sdxl");
        assert_eq!(r.repository, "h94/IP-Adapter");
        assert_eq!(r.subfolder, "sdxl_models");
        assert_eq!(r.weight_name, "ip-adapter_sdxl.bin");
        assert!(r.image_encoder_folder.is_none());
    }

    #[test]
    fn resolve_vit_h_aliases() {
        let r = resolve_adapter("plus-face");
        assert_eq!(r.weight_name, "ip-adapter-plus-face_sdxl_vit-h.safetensors");
        assert_eq!(r.image_encoder_folder.as_deref(), Some("models/image_encoder"));
    }

    #[test]
    fn exact_name_passthrough() {
        let r = resolve_adapter("ip-adapter_sdxl.safetensors");
        assert_eq!(r.weight_name, "ip-adapter_sdxl.safetensors");
        assert!(r.image_encoder_folder.is_none());

        let r = resolve_adapter("custom_sdxl_vit-h.bin");
        assert_eq!(r.image_encoder_folder.as_deref(), Some("models/image_encoder"));
    }
}
