//! Gemini `generateContent` adapter for `CatAnalyzer`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AnalysisError, CatAnalyzer};
use crate::photo::base64_payload;
use crate::state::data::AnalysisResult;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const USER_AGENT: &str = concat!("xmu-cats/", env!("CARGO_PKG_VERSION"));

const PROMPT: &str = "Analyze this image for a stray cat management system.
Identify the cat's visual characteristics.
If no cat is clearly visible, provide best guess but note it in features.
Provide output in Chinese (Simplified).";

/// Structured shape the model is asked to answer with
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatDescription {
    breed: String,
    color: String,
    estimated_age: String,
    features: String,
    #[serde(default)]
    possible_name_suggestions: Vec<String>,
    visual_health_assessment: String,
}

impl From<CatDescription> for AnalysisResult {
    fn from(d: CatDescription) -> Self {
        AnalysisResult {
            breed: d.breed,
            color: d.color,
            estimated_age: d.estimated_age,
            features: d.features,
            health_assessment: d.visual_health_assessment,
            name_suggestions: d.possible_name_suggestions,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini vision client
pub struct GeminiAnalyzer {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiAnalyzer {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, AnalysisError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.into(),
            endpoint: endpoint.into(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl CatAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, image: &str) -> Result<AnalysisResult, AnalysisError> {
        let api_key = self.api_key.as_deref().ok_or(AnalysisError::MissingApiKey)?;

        tracing::debug!(model = %self.model, bytes = image.len(), "Requesting cat analysis");

        let response = self
            .http_client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request_body(image))
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api(status.as_u16(), error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let result = parse_response(&body)?;
        tracing::info!(breed = %result.breed, "Cat analysis complete");
        Ok(result)
    }
}

/// Request payload: inline JPEG, fixed prompt, JSON response schema
fn request_body(image: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                {
                    "inline_data": {
                        "mime_type": "image/jpeg",
                        "data": base64_payload(image)
                    }
                },
                { "text": PROMPT }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "breed": {
                        "type": "STRING",
                        "description": "Guessed breed (e.g., Chinese Garden Cat, Orange Tabby)"
                    },
                    "color": {
                        "type": "STRING",
                        "description": "Primary colors and pattern"
                    },
                    "estimatedAge": {
                        "type": "STRING",
                        "description": "Estimated age (e.g., 'Adult', 'Kitten', '2 years')"
                    },
                    "features": {
                        "type": "STRING",
                        "description": "Distinctive physical features (e.g., bobtail, tipped ear)"
                    },
                    "possibleNameSuggestions": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "3 cute name suggestions based on appearance"
                    },
                    "visualHealthAssessment": {
                        "type": "STRING",
                        "description": "Visual health check (e.g., 'Looks healthy', 'Dirty fur', 'Eye infection')"
                    }
                },
                "required": ["breed", "color", "estimatedAge", "features", "visualHealthAssessment"]
            }
        }
    })
}

/// Pull the JSON answer out of a `generateContent` response
fn parse_response(body: &str) -> Result<AnalysisResult, AnalysisError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let description: CatDescription =
        serde_json::from_str(&text).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    Ok(description.into())
}
