use std::env;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GoogleSearch, Part, Tool,
};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey")]
    ApiKeyNotSet,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// One grounded generation call.
/// Implemented by `GeminiClient` for production; mock implementations used in tests.
pub trait GenerateClient {
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, GeminiError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Reads `GEMINI_API_KEY` and `GEMINI_MODEL`. An explicit `model` wins over the environment.
    pub fn from_env(http: Client, model: Option<String>) -> Result<Self, GeminiError> {
        let api_key = resolve_api_key(env::var("GEMINI_API_KEY").ok())?;
        Ok(Self {
            http,
            api_key,
            model: resolve_model(model, env::var("GEMINI_MODEL").ok()),
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_api_key(key: Option<String>) -> Result<ApiKey, GeminiError> {
    non_blank(key).map(ApiKey).ok_or(GeminiError::ApiKeyNotSet)
}

/// First non-blank of `explicit`, then `env`, else `DEFAULT_MODEL`.
fn resolve_model(explicit: Option<String>, env: Option<String>) -> String {
    non_blank(explicit)
        .or_else(|| non_blank(env))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

impl GenerateClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, GeminiError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
                role: None,
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Gemini API rate limited");
            return Err(GeminiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<GenerateContentResponse>(&text)
                && let Some(err) = &body.error
            {
                let classified = classify_api_error(err);
                warn!(error = %classified, "Gemini API error");
                return Err(classified);
            }
            let end = text.floor_char_boundary(200);
            warn!(status = %status, "Gemini API error (no structured body)");
            return Err(GeminiError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {}", &text[..end]),
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        debug!(model = %self.model, "gemini generation complete");

        if let Some(err) = &body.error {
            let classified = classify_api_error(err);
            warn!(error = %classified, "Gemini API error in 200 response");
            return Err(classified);
        }

        Ok(body)
    }
}

fn classify_api_error(err: &ApiError) -> GeminiError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match err.code {
        Some(429) => GeminiError::RateLimited,
        Some(403) => GeminiError::QuotaExhausted(message),
        Some(code) => GeminiError::Api { code, message },
        None => GeminiError::Api {
            code: 0,
            message: format!("Unknown error (no status code): {message}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_429_as_rate_limited() {
        let err = ApiError {
            code: Some(429),
            message: Some("Resource exhausted".into()),
        };
        assert!(matches!(classify_api_error(&err), GeminiError::RateLimited));
    }

    #[test]
    fn classify_403_as_quota_exhausted() {
        let err = ApiError {
            code: Some(403),
            message: Some("Quota exceeded".into()),
        };
        assert!(matches!(
            classify_api_error(&err),
            GeminiError::QuotaExhausted(_)
        ));
    }

    #[test]
    fn classify_missing_code_keeps_message() {
        let err = ApiError {
            code: None,
            message: Some("weird".into()),
        };
        match classify_api_error(&err) {
            GeminiError::Api { code, message } => {
                assert_eq!(code, 0);
                assert!(message.contains("weird"));
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn explicit_model_wins_over_env() {
        assert_eq!(
            resolve_model(Some("gemini-2.5-pro".into()), Some("gemini-2.0-flash".into())),
            "gemini-2.5-pro"
        );
    }

    #[test]
    fn blank_explicit_model_falls_back_to_env() {
        assert_eq!(
            resolve_model(Some("  ".into()), Some(" gemini-2.0-flash\n".into())),
            "gemini-2.0-flash"
        );
        assert_eq!(resolve_model(None, Some("gemini-2.0-flash".into())), "gemini-2.0-flash");
    }

    #[test]
    fn blank_models_fall_back_to_default() {
        assert_eq!(resolve_model(Some("".into()), Some(" ".into())), DEFAULT_MODEL);
        assert_eq!(resolve_model(None, None), DEFAULT_MODEL);
    }

    #[test]
    fn missing_or_blank_key_is_not_set() {
        assert!(matches!(resolve_api_key(None), Err(GeminiError::ApiKeyNotSet)));
        assert!(matches!(
            resolve_api_key(Some(" \t".into())),
            Err(GeminiError::ApiKeyNotSet)
        ));
        let key = resolve_api_key(Some(" abc \n".into())).unwrap();
        assert_eq!(key.0, "abc");
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let client = GeminiClient::with_base_url(Client::new(), "http://localhost:0");
        let debug = format!("{client:?}");
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
