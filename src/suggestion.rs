use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::coin::{format_price, Coin};

pub const NO_SUGGESTION: &str = "No suggestion returned";
pub const SUGGESTION_ERROR: &str = "Error fetching suggestion";

/// Client for a `generateContent`-style text completion endpoint.
#[derive(Clone)]
pub struct SuggestionClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

pub fn build_prompt(coin: &Coin) -> String {
    format!(
        "You are an educational AI assistant. The current price of {} is ${}. \
         Provide short educational ranges: Enter: <USD range> Exit: <USD range>. \
         2 lines max. Not financial advice.",
        coin.symbol.to_uppercase(),
        format_price(coin.current_price)
    )
}

/// First candidate's first text part, trimmed.
pub fn extract_text(resp: &GenerateResponse) -> String {
    resp.candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NO_SUGGESTION.to_string())
}

impl SuggestionClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub async fn suggest(&self, coin: &Coin) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("GEMINI_API_KEY is not set".to_string()))?;

        let req = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(build_prompt(coin)),
                }],
            }],
        };

        tracing::info!(symbol = %coin.symbol, model = %self.model, "Requesting suggestion");
        let resp = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .timeout(self.timeout)
            .json(&req)
            .send()
            .await
            .map_err(AppError::network)?;

        let status = resp.status();
        let body = resp.text().await.map_err(AppError::network)?;
        if !status.is_success() {
            let snippet: String = body.chars().take(300).collect();
            return Err(AppError::NetworkFailure(format!(
                "suggestion {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        Ok(extract_text(&parsed))
    }
}
