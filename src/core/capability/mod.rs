//! # Capability Module
//!
//! Reports which parts of the engine this build can run.
//!
//! Blur scoring only needs the decoders and is always present. Feature
//! prints depend on the descriptor backends selected at compile time.
//! The probe runs once per process; the answer cannot change afterwards.

use crate::core::feature_print::{is_supported, DescriptorKind};
use serde::Serialize;
use std::sync::OnceLock;

/// One descriptor backend and whether it is usable
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorInfo {
    pub kind: DescriptorKind,
    pub version: &'static str,
    pub available: bool,
}

/// Result of the capability probe
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub blur: bool,
    pub feature_print: bool,
    pub descriptors: Vec<DescriptorInfo>,
    /// Engine name, version and enabled descriptor tags
    pub version: String,
}

impl Capabilities {
    fn detect() -> Self {
        let descriptors: Vec<DescriptorInfo> = DescriptorKind::all()
            .into_iter()
            .map(|kind| DescriptorInfo {
                kind,
                version: kind.version(),
                available: is_supported(kind),
            })
            .collect();

        let enabled: Vec<&str> = descriptors
            .iter()
            .filter(|d| d.available)
            .map(|d| d.version)
            .collect();

        let version = if enabled.is_empty() {
            format!("photo-vision {} (blur only)", env!("CARGO_PKG_VERSION"))
        } else {
            format!(
                "photo-vision {} ({})",
                env!("CARGO_PKG_VERSION"),
                enabled.join(", ")
            )
        };

        Self {
            blur: true,
            feature_print: !enabled.is_empty(),
            descriptors,
            version,
        }
    }
}

static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

/// Probe the build once and cache the answer
pub fn probe() -> &'static Capabilities {
    CAPABILITIES.get_or_init(|| {
        let capabilities = Capabilities::detect();
        tracing::debug!(
            feature_print = capabilities.feature_print,
            version = %capabilities.version,
            "capability probe"
        );
        capabilities
    })
}

/// Whether the vision (descriptor) capability is present
pub fn is_available() -> bool {
    probe().feature_print
}

/// Version string reported to channel callers
pub fn vision_version() -> &'static str {
    &probe().version
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_is_always_available() {
        assert!(probe().blur);
    }

    #[test]
    fn probe_is_stable() {
        assert!(std::ptr::eq(probe(), probe()));
    }

    #[test]
    fn every_descriptor_is_listed() {
        let kinds: Vec<DescriptorKind> = probe().descriptors.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, DescriptorKind::all().to_vec());
    }

    #[test]
    fn version_names_the_engine() {
        assert!(vision_version().starts_with("photo-vision "));
        assert!(vision_version().contains(env!("CARGO_PKG_VERSION")));
    }

    #[cfg(feature = "descriptors")]
    #[test]
    fn descriptors_feature_enables_feature_prints() {
        assert!(is_available());
        assert!(vision_version().contains(DescriptorKind::GradientHash.version()));
    }

    #[cfg(not(feature = "descriptors"))]
    #[test]
    fn without_descriptors_only_blur_runs() {
        assert!(!is_available());
        assert!(vision_version().contains("blur only"));
    }
}
