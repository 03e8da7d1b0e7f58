use std::time::Duration;

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::DomainError;
use crate::infrastructure::config::{Credential, OpenAiConfig};

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    credential: Option<Credential>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, DomainError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| DomainError::config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential: config.api_key.clone(),
        })
    }

    pub async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, DomainError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let credential = self
            .credential
            .as_ref()
            .ok_or_else(|| DomainError::auth("no API key configured"))?;

        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .bearer_auth(credential.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(%url, error = %e, "request failed");
                DomainError::service(format!("request to {url} failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(%url, %status, "API error");
            return Err(classify_status(status, &detail));
        }

        response.json().await.map_err(|e| {
            error!(%url, error = %e, "failed to parse response");
            DomainError::service(format!("failed to parse response: {e}"))
        })
    }
}

/// 401/403 → `Auth`, 429 → `RateLimit`, anything else → `Service`.
pub fn classify_status(status: StatusCode, detail: &str) -> DomainError {
    let message = format!("API returned {status}: {detail}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DomainError::auth(message),
        StatusCode::TOO_MANY_REQUESTS => DomainError::rate_limit(message),
        _ => DomainError::service(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "bad key"),
            DomainError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, ""),
            DomainError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "quota"),
            DomainError::RateLimit(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
            DomainError::Service(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "empty input"),
            DomainError::Service(_)
        ));
    }

    #[test]
    fn test_error_message_includes_detail() {
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, "You exceeded your quota");
        assert!(err.to_string().contains("You exceeded your quota"));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_request() {
        let client = OpenAiClient::new(&OpenAiConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: Some(1),
        })
        .unwrap();

        let result: Result<serde_json::Value, _> =
            client.post_json("embeddings", &serde_json::json!({})).await;
        assert!(matches!(result, Err(DomainError::Auth(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_is_service_error() {
        let client = OpenAiClient::new(&OpenAiConfig {
            api_key: Some(Credential::new("sk-test")),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: Some(2),
        })
        .unwrap();

        let result: Result<serde_json::Value, _> =
            client.post_json("embeddings", &serde_json::json!({})).await;
        assert!(matches!(result, Err(DomainError::Service(_))));
    }
}
