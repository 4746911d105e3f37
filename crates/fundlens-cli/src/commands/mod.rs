//! Command implementations.

pub mod chunk;
pub mod config;
pub mod extract;
pub mod process;
pub mod validate;

pub use self::chunk::execute_chunk;
pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::process::execute_process;
pub use self::validate::execute_validate;

use crate::config::{LlmBackend, LlmSettings};
use crate::error::Result;
use anyhow::Context;
use fundlens_llm::OllamaProvider;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Read a document into memory.
pub fn read_document(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Build the configured LLM provider, if any.
pub fn build_llm(settings: &LlmSettings) -> Result<Option<OllamaProvider>> {
    match settings.backend {
        LlmBackend::None => Ok(None),
        LlmBackend::Ollama => {
            debug!(endpoint = %settings.endpoint, model = %settings.model, "Using Ollama backend");
            let provider = OllamaProvider::with_timeout(
                settings.endpoint.as_str(),
                settings.model.as_str(),
                Duration::from_secs(settings.request_timeout_secs),
            )?;
            Ok(Some(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_backend_builds_nothing() {
        assert!(build_llm(&LlmSettings::default()).unwrap().is_none());
    }

    #[test]
    fn test_ollama_backend_builds_provider() {
        let settings = LlmSettings {
            backend: LlmBackend::Ollama,
            model: "mistral".to_string(),
            ..LlmSettings::default()
        };
        let provider = build_llm(&settings).unwrap().unwrap();
        assert_eq!(provider.model(), "mistral");
    }

    #[test]
    fn test_read_missing_document_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.md");
        let err = read_document(&path).unwrap_err();
        assert!(err.to_string().contains("missing.md"));
    }
}
