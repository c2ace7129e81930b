//! Command handlers -- one module per subcommand

pub mod backends;
pub mod config;
pub mod scan;

use std::sync::Arc;

use omniscan_core::{BackendRegistry, OmniscanConfig};
use omniscan_semantic::SemanticBackend;

use crate::error::CliError;

/// Build the backend registry the way a scan would see it.
///
/// Process backends are always registered; the semantic backend is added
/// only when enabled in config. A missing API key surfaces here, before
/// any scan work starts.
pub fn build_registry(config: &OmniscanConfig) -> Result<BackendRegistry, CliError> {
    let mut registry = BackendRegistry::new();
    omniscan_backends::register_defaults(&mut registry)
        .map_err(|e| CliError::Command(e.to_string()))?;

    if config.semantic.enabled {
        let backend = SemanticBackend::from_config(&config.semantic)?;
        registry
            .register_remote(Arc::new(backend))
            .map_err(|e| CliError::Command(e.to_string()))?;
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_without_semantic_has_four_backends() {
        let config = OmniscanConfig::default();
        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.len(), 4);
        assert!(registry.get("semantic").is_none());
    }
}
