//! Google Gemini provider (Generative Language REST API)

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::Generator;
use crate::config::{AssistantConfig, GenerationConfig};

pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    max_output_tokens: usize,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(15))
            .timeout(std::time::Duration::from_secs(300))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_output_tokens: config.max_output_tokens,
            client,
        })
    }

    /// Construct from config, reading the API key from the configured env var.
    ///
    /// A missing key is a startup failure, not a per-turn one.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(api_key, &config.generation)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, system_instruction: &str, user_prompt: &str, temperature: f32) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{"text": system_instruction}]
            },
            "contents": [{
                "role": "user",
                "parts": [{"text": user_prompt}]
            }],
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": self.max_output_tokens,
            }
        })
    }
}

#[async_trait]
impl Generator for GeminiProvider {
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let endpoint = self.endpoint();
        let request = self.build_request(system_instruction, user_prompt, temperature);

        tracing::debug!(model = %self.model, temperature, "Calling Gemini generateContent");

        let response = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", endpoint))?;

        if !status.is_success() {
            return Err(anyhow!("Google API error ({}): {}", status, body));
        }

        let parsed: GoogleResponse = parse_json_body(status, &body, &endpoint)?;
        Ok(parsed.text())
    }
}

/// Parse a response body as JSON, returning a clear error if the server returned HTML.
fn parse_json_body<T: serde::de::DeserializeOwned>(
    status: StatusCode,
    body: &str,
    endpoint: &str,
) -> Result<T> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        let preview: String = trimmed.chars().take(200).collect();
        return Err(anyhow!(
            "Endpoint {} returned HTML instead of JSON (HTTP {}), service may be down. Response: {}",
            endpoint,
            status,
            preview
        ));
    }
    serde_json::from_str::<T>(body).map_err(|e| {
        let preview: String = body.chars().take(300).collect();
        anyhow!(
            "Failed to parse JSON from {} (HTTP {}): {}. Body: {}",
            endpoint,
            status,
            e,
            preview
        )
    })
}

#[derive(Deserialize, Default)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Deserialize, Default)]
struct GoogleCandidate {
    #[serde(default)]
    content: GoogleContent,
}

#[derive(Deserialize, Default)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize, Default)]
struct GooglePart {
    #[serde(default)]
    text: String,
}

impl GoogleResponse {
    /// Concatenated text of the first candidate; empty when the model produced nothing.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
