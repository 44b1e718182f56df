//! Generative-AI collaborator. Calls return untyped JSON; [`coerce`] turns
//! it into engine types before anything else sees it.

pub mod coerce;
mod gemini;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use coerce::{meal_estimate_from, reference_from, MealEstimate};
pub use gemini::{GeminiClient, GeminiConfig};

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI API key is not configured")]
    MissingApiKey,
    #[error("AI API key was rejected")]
    InvalidApiKey,
    #[error("AI request failed: {0}")]
    Request(String),
    #[error("AI returned an unusable response: {0}")]
    InvalidResponse(String),
}

impl AiError {
    /// Credential problems the operator has to fix, as opposed to
    /// transient upstream failures.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::InvalidApiKey)
    }
}

/// Language the AI answers in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Language {
    /// Name used inside prompts.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Self::PtBr => "Portuguese (Brazil)",
            Self::EnUs => "English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PtBr => "pt-BR",
            Self::EnUs => "en-US",
        })
    }
}

/// An image ready to send: raw base64 payload plus its MIME type.
#[derive(Clone, Copy)]
pub struct ImagePayload<'a> {
    pub base64: &'a str,
    pub mime_type: &'a str,
}

impl fmt::Debug for ImagePayload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.base64.len())
            .finish()
    }
}

#[async_trait]
pub trait NutritionAi: Send + Sync {
    /// Vision analysis of a meal photo.
    async fn analyze_meal(
        &self,
        image: ImagePayload<'_>,
        language: Language,
        history_context: &str,
    ) -> Result<Value, AiError>;

    /// Per-100 g estimate for a named ingredient.
    async fn estimate_ingredient(&self, name: &str) -> Result<Value, AiError>;
}
