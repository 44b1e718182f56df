use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use super::{AiError, ImagePayload, Language, NutritionAi};

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const PLACEHOLDER_KEY: &str = "SUA_CHAVE";
const TEMPERATURE: f64 = 0.2;

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Debug for GeminiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Gemini `generateContent` client with JSON-constrained output.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: API_BASE_URL.to_owned(),
            client,
        })
    }

    fn api_key(&self) -> Result<&str, AiError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && !key.contains(PLACEHOLDER_KEY) => Ok(key),
            _ => Err(AiError::MissingApiKey),
        }
    }

    /// The key travels in a header so the URL is safe to log.
    fn build_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<Value, AiError> {
        let key = self.api_key()?;
        let response = self
            .client
            .post(self.build_url())
            .header(API_KEY_HEADER, key)
            .json(request)
            .send()
            .await
            .map_err(|e| AiError::Request(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::Request(format!("failed to read response: {}", e.without_url())))?;

        if !status.is_success() {
            error!(%status, "Gemini API error");
            return Err(map_api_error(status.as_u16(), &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| AiError::InvalidResponse(format!("malformed envelope: {e}")))?;
        if let Some(err) = parsed.error {
            return Err(AiError::Request(err.message));
        }

        let text = response_text(&parsed);
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        debug!(len = text.len(), "Gemini response received");
        serde_json::from_str(text)
            .map_err(|e| AiError::InvalidResponse(format!("model output is not JSON: {e}")))
    }
}

#[async_trait]
impl NutritionAi for GeminiClient {
    #[instrument(skip(self, image, history_context), fields(model = %self.model))]
    async fn analyze_meal(
        &self,
        image: ImagePayload<'_>,
        language: Language,
        history_context: &str,
    ) -> Result<Value, AiError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: image.base64,
                        },
                    },
                    Part::Text {
                        text: "Analyze this meal. Provide estimated amounts and macronutrients. \
                               Match the response schema exactly."
                            .to_owned(),
                    },
                ],
            }],
            system_instruction: Some(Content {
                parts: vec![Part::Text {
                    text: system_instruction(language, history_context),
                }],
            }),
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: analysis_schema(),
                temperature: Some(TEMPERATURE),
            },
        };
        self.generate(&request).await
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn estimate_ingredient(&self, name: &str) -> Result<Value, AiError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: format!(
                        "Estimate nutritional values for 100g of \"{name}\". \
                         Consider synonyms and common Brazilian variations. \
                         Provide realistic values for calories, protein, carbs, and fat \
                         per 100g of the edible portion."
                    ),
                }],
            }],
            system_instruction: None,
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: ingredient_schema(),
                temperature: None,
            },
        };
        self.generate(&request).await
    }
}

impl Debug for GeminiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

fn response_text(response: &GenerateResponse) -> String {
    response
        .candidates
        .iter()
        .flatten()
        .take(1)
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect()
}

fn map_api_error(status: u16, body: &str) -> AiError {
    let message = serde_json::from_str::<GenerateResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map_or_else(|| body.to_owned(), |e| e.message);

    if matches!(status, 401 | 403) || message.contains("API key not valid") {
        return AiError::InvalidApiKey;
    }
    AiError::Request(format!("Gemini API error ({status}): {message}"))
}

fn system_instruction(language: Language, history_context: &str) -> String {
    format!(
        "You are a world-class nutrition expert and food vision AI. \
         Your task is to analyze food images and provide detailed nutritional estimates.\n\
         \n\
         IMPORTANT CONTEXT:\n\
         - Focus especially on Brazilian cuisine (staples like Rice and Beans, Linguiça, \
         Pão de Queijo, cuts of beef like Picanha or Acém, and typical sides like \
         Purê de Batata or Farofa).\n\
         - Be flexible with food names. Handle synonyms (e.g. 'Purê' and 'Batata Amassada' \
         are the same).\n\
         - If unsure about an item, use the best estimated average for that food category.\n\
         - History context provided: {history_context}. Use this to improve consistency \
         with previous user meals.\n\
         - Return the results in {}.",
        language.prompt_name()
    )
}

fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "calories": { "type": "NUMBER" },
            "healthScore": { "type": "NUMBER" },
            "protein": { "type": "NUMBER" },
            "carbs": { "type": "NUMBER" },
            "fat": { "type": "NUMBER" },
            "fiber": { "type": "NUMBER" },
            "items": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "amount": { "type": "STRING" },
                        "calories": { "type": "NUMBER" },
                        "protein": { "type": "NUMBER" },
                        "carbs": { "type": "NUMBER" },
                        "fat": { "type": "NUMBER" },
                        "confidence": { "type": "STRING", "enum": ["high", "medium", "low"] }
                    },
                    "required": ["name", "amount", "calories", "protein", "carbs", "fat", "confidence"]
                }
            },
            "ingredients": { "type": "ARRAY", "items": { "type": "STRING" } },
            "observation": { "type": "STRING" }
        },
        "required": ["name", "calories", "healthScore", "protein", "carbs", "fat",
                     "items", "ingredients", "observation"]
    })
}

fn ingredient_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "calories": { "type": "NUMBER", "description": "Calories per 100g" },
            "protein": { "type": "NUMBER", "description": "Protein per 100g" },
            "carbs": { "type": "NUMBER", "description": "Carbs per 100g" },
            "fat": { "type": "NUMBER", "description": "Fat per 100g" }
        },
        "required": ["calories", "protein", "carbs", "fat"]
    })
}
