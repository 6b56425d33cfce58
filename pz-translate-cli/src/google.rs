//! Google Translate v2 provider.
//!
//! The API key is read from the `GOOGLE_TRANSLATE_API_KEY` environment
//! variable. Client errors (HTTP 4xx) are permanent; server errors, timeouts
//! and connection problems are transient, so an interrupted run can resume.

use async_trait::async_trait;
use pz_translate::translator::{TranslateError, TranslateResult, Translator};
use serde_json::json;

pub const API_KEY_VARIABLE: &str = "GOOGLE_TRANSLATE_API_KEY";

#[derive(Clone)]
pub struct GoogleTranslateProvider {
    api_key: String,
    source: String,
    batch: bool,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Maximum texts per request.
    const MAX_BATCH_SIZE: usize = 128;

    /// Maximum characters per text.
    const MAX_CHARS_PER_STRING: usize = 30_000;

    pub fn new(api_key: String, source: &str) -> TranslateResult<Self> {
        if api_key.trim().is_empty() {
            return Err(TranslateError::Permanent("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| TranslateError::Permanent(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            source: source.to_string(),
            batch: true,
            client,
            base_url: "https://translation.googleapis.com/language/translate/v2".to_string(),
        })
    }

    pub fn from_env(source: &str) -> TranslateResult<Self> {
        let api_key = std::env::var(API_KEY_VARIABLE).map_err(|_| {
            TranslateError::Permanent(format!("{} environment variable not set", API_KEY_VARIABLE))
        })?;
        Self::new(api_key, source)
    }

    /// Whether several texts are sent per request.
    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn check_length(texts: &[String]) -> TranslateResult<()> {
        for (i, text) in texts.iter().enumerate() {
            if text.chars().count() > Self::MAX_CHARS_PER_STRING {
                return Err(TranslateError::Permanent(format!(
                    "Text at index {} exceeds maximum length of {} characters",
                    i,
                    Self::MAX_CHARS_PER_STRING
                )));
            }
        }
        Ok(())
    }

    async fn translate_chunk(&self, texts: &[String], target: &str) -> TranslateResult<Vec<String>> {
        let url = format!("{}?key={}", self.base_url, self.api_key);
        let body = json!({
            "q": texts,
            "source": self.source,
            "target": target,
            "format": "text"
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::Transient(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status, &error_text));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Transient(format!("Failed to read API response: {}", e)))?;
        parse_translations(&json, texts.len())
    }
}

fn classify_status(status: reqwest::StatusCode, body: &str) -> TranslateError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        TranslateError::Transient(format!("API server error ({}): {}", status, body))
    } else {
        TranslateError::Permanent(format!("API client error ({}): {}", status, body))
    }
}

fn parse_translations(json: &serde_json::Value, expected: usize) -> TranslateResult<Vec<String>> {
    let translations = json["data"]["translations"].as_array().ok_or_else(|| {
        TranslateError::Permanent("Invalid API response: missing 'data.translations' array".to_string())
    })?;
    let results = translations
        .iter()
        .map(|t| {
            t["translatedText"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| {
                    TranslateError::Permanent(
                        "Invalid API response: missing 'translatedText' field".to_string(),
                    )
                })
        })
        .collect::<TranslateResult<Vec<String>>>()?;
    if results.len() != expected {
        return Err(TranslateError::Permanent(format!(
            "Invalid API response: {} translations for {} texts",
            results.len(),
            expected
        )));
    }
    Ok(results)
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("source", &self.source)
            .field("batch", &self.batch)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Translator for GoogleTranslateProvider {
    async fn translate(&self, text: &str, target: &str) -> TranslateResult<String> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let texts = [text.to_string()];
        Self::check_length(&texts)?;
        let results = self.translate_chunk(&texts, target).await?;
        Ok(results.into_iter().next().unwrap_or_default())
    }

    async fn translate_batch(&self, texts: &[String], target: &str) -> TranslateResult<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        Self::check_length(texts)?;
        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(Self::MAX_BATCH_SIZE) {
            all_results.extend(self.translate_chunk(chunk, target).await?);
        }
        Ok(all_results)
    }

    fn supports_batch(&self) -> bool {
        self.batch
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}
