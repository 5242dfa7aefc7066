//! Answer backend client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use ops_voice_config::BackendConfig;
use ops_voice_core::{AnswerBackend, Result};

use crate::ClientError;

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    query: &'a str,
    branch_context: &'a str,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer_text: String,
}

/// Client for the `ask(query, context) -> answer text` collaborator
pub struct AskClient {
    client: Client,
    url: String,
}

impl AskClient {
    pub fn new(config: &BackendConfig) -> std::result::Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: format!("{}{}", config.base_url.trim_end_matches('/'), config.ask_path),
        })
    }

    async fn ask_inner(
        &self,
        query: &str,
        branch_context: &str,
        language: &str,
    ) -> std::result::Result<String, ClientError> {
        let response = self
            .client
            .post(&self.url)
            .json(&AskRequest {
                query,
                branch_context,
                language,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body: AskResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        Ok(body.answer_text)
    }
}

#[async_trait]
impl AnswerBackend for AskClient {
    async fn ask(&self, query: &str, branch_context: &str, language: &str) -> Result<String> {
        let answer = self
            .ask_inner(query, branch_context, language)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "ask request failed");
                e
            })?;
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join_strips_trailing_slash() {
        let config = BackendConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..Default::default()
        };
        let client = AskClient::new(&config).unwrap();
        assert_eq!(client.url, "http://localhost:8080/api/assistant/ask");
    }

    #[test]
    fn test_request_serialization() {
        let req = AskRequest {
            query: "device count",
            branch_context: "BR042",
            language: "en",
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["query"], "device count");
        assert_eq!(json["branch_context"], "BR042");
    }

    #[test]
    fn test_response_deserialization() {
        let body: AskResponse =
            serde_json::from_str(r#"{"answer_text":"All devices are up."}"#).unwrap();
        assert_eq!(body.answer_text, "All devices are up.");

        // Missing field is malformed, not an empty answer
        assert!(serde_json::from_str::<AskResponse>(r#"{"answer":"x"}"#).is_err());
    }
}
