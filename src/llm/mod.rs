pub mod providers;

use crate::config::LlmConfig;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::debug;

#[derive(Debug)]
pub enum LlmError {
    ConnectionError(String),
    ResponseError(String),
    ConfigError(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ConnectionError(msg) => write!(f, "LLM connection error: {}", msg),
            LlmError::ResponseError(msg) => write!(f, "LLM response error: {}", msg),
            LlmError::ConfigError(msg) => write!(f, "LLM configuration error: {}", msg),
        }
    }
}

impl Error for LlmError {}

/// A text-completion model. Providers may ignore `stop`; callers going through
/// `LlmManager` get the output truncated regardless.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String, LlmError>;
}

pub struct LlmManager {
    backend: String,
    model: Box<dyn LanguageModel>,
}

impl LlmManager {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let model: Box<dyn LanguageModel> = match config.backend.as_str() {
            "remote" => Box::new(providers::remote::RemoteLlmProvider::new(config)?),
            "ollama" => Box::new(providers::ollama::OllamaProvider::new(config)?),
            _ => {
                return Err(LlmError::ConfigError(format!(
                    "Unsupported LLM backend: {}",
                    config.backend
                )))
            }
        };

        Ok(Self {
            backend: config.backend.clone(),
            model,
        })
    }

    pub fn from_model(backend: impl Into<String>, model: Box<dyn LanguageModel>) -> Self {
        Self {
            backend: backend.into(),
            model,
        }
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String, LlmError> {
        let output = self.model.complete(prompt, stop).await?;
        debug!("Raw completion: {}", output);
        Ok(truncate_at_stop(&output, stop).to_string())
    }
}

/// Cuts `text` at the earliest occurrence of any stop sequence.
pub fn truncate_at_stop<'a>(text: &'a str, stop: &[String]) -> &'a str {
    let end = stop
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
        .unwrap_or(text.len());
    &text[..end]
}
