use crate::error::{ForecastBuilderError, Result};
use crate::llm::types::*;
use reqwest::{Client, StatusCode};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Reads `GEMINI_API_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ForecastBuilderError::InvalidSettings("GEMINI_API_KEY is not set".to_string())
            })?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) async fn generate_content(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let payload = GenerateContentRequest {
            contents: vec![Content::text("user", user_prompt)],
            system_instruction: Some(Content::text("user", system_prompt)),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature,
            },
        };

        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.map_err(reqwest::Error::without_url)?;
            return Err(classify_failure(status, &err_text));
        }

        let body: GenerateContentResponse = res.json().await.map_err(|e| {
            ForecastBuilderError::MalformedResponse(format!("undecodable response body: {}", e))
        })?;

        extract_text(body)
    }
}

pub(crate) fn classify_failure(status: StatusCode, body: &str) -> ForecastBuilderError {
    if status == StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED") {
        ForecastBuilderError::RateLimited(format!("status {}", status))
    } else {
        ForecastBuilderError::ForecastFailed(format!(
            "Gemini API Error (status {}): {}",
            status, body
        ))
    }
}

pub(crate) fn extract_text(body: GenerateContentResponse) -> Result<String> {
    let text = body
        .candidates
        .ok_or_else(|| {
            ForecastBuilderError::MalformedResponse("No candidates returned".to_string())
        })?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ForecastBuilderError::MalformedResponse("Empty candidates list".to_string())
        })?
        .content
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            ForecastBuilderError::MalformedResponse("No text parts in content".to_string())
        })?;

    if text.trim().is_empty() {
        return Err(ForecastBuilderError::MalformedResponse(
            "Model returned empty text".to_string(),
        ));
    }
    Ok(text)
}
