//! Fundlens LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `fundlens-domain`. The
//! extraction pipeline only needs "prompt in, text out", so any backend that
//! can do that plugs in here.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use fundlens_llm::MockProvider;
//! use fundlens_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("NOT_FOUND");
//! let result = provider.generate("Extract the fund size").unwrap();
//! assert_eq!(result, "NOT_FOUND");
//! ```

#![warn(missing_docs)]

pub mod ollama;

use fundlens_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider could not be set up
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

const ERROR_SENTINEL: &str = "ERROR";

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Responses can be keyed on the exact prompt or on a fragment the prompt
/// contains; exact matches win, then fragments in insertion order, then the
/// default response.
///
/// # Examples
///
/// ```
/// use fundlens_llm::MockProvider;
/// use fundlens_domain::traits::LlmProvider;
///
/// let mut provider = MockProvider::new("NOT_FOUND");
/// provider.add_response_containing("Field: fundSize", "50000");
/// assert_eq!(provider.generate("...Field: fundSize...").unwrap(), "50000");
/// assert_eq!(provider.generate("Field: irr").unwrap(), "NOT_FOUND");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    fragments: Arc<Mutex<Vec<(String, String)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            fragments: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), response.into());
    }

    /// Respond with `response` to any prompt containing `fragment`
    pub fn add_response_containing(
        &mut self,
        fragment: impl Into<String>,
        response: impl Into<String>,
    ) {
        lock(&self.fragments).push((fragment.into(), response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), ERROR_SENTINEL.to_string());
    }

    /// Return an error for any prompt containing `fragment`
    pub fn add_error_containing(&mut self, fragment: impl Into<String>) {
        lock(&self.fragments).push((fragment.into(), ERROR_SENTINEL.to_string()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }

    fn lookup(&self, prompt: &str) -> String {
        if let Some(response) = lock(&self.responses).get(prompt) {
            return response.clone();
        }
        lock(&self.fragments)
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        lock(&self.prompts).push(prompt.to_string());

        let response = self.lookup(prompt);
        if response == ERROR_SENTINEL {
            return Err(LlmError::Other("Mock error".to_string()));
        }
        Ok(response)
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt)
    }
}
