//! Messages API client.
//!
//! One POST per call, no retries. Non-success statuses surface the
//! service's error message; the reply text is unwrapped from optional
//! markdown fences and decoded into the requested record.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClaudeConfig;
use crate::prompts::{
    build_structure_prompt, build_tokens_prompt, STRUCTURE_SYSTEM_PROMPT, TOKENS_SYSTEM_PROMPT,
};
use crate::types::*;
use csslens_core::{Error, Result};
use csslens_scrape::CssSnapshot;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

static LEADING_FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^```(?:json)?\s*").unwrap());
static TRAILING_FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)```\s*$").unwrap());

/// Turns snapshots into interpreted records.
#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn extract_tokens(&self, snapshot: &CssSnapshot, api_key: &str) -> Result<DesignTokens>;

    async fn analyze_structure(
        &self,
        snapshot: &CssSnapshot,
        api_key: &str,
    ) -> Result<StructureAnalysis>;
}

/// Anthropic Messages API client.
pub struct ClaudeClient {
    client: Client,
    config: ClaudeConfig,
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn build_request(&self, system: &str, user_message: String) -> MessagesRequest {
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: system.to_string(),
            messages: vec![RequestMessage {
                role: "user".into(),
                content: user_message,
            }],
        }
    }

    /// Send one request and return the first content block's text.
    async fn send(&self, request: &MessagesRequest, api_key: &str) -> Result<String> {
        let url = self.config.messages_url();
        debug!("Calling {} with model {}", url, request.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Remote(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Claude API error: {}", status.as_u16()));
            warn!("Messages API returned {}: {}", status, message);
            return Err(Error::Remote(message));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        body.content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| Error::Parse("response has no text content".into()))
    }

    async fn complete_json<T: DeserializeOwned>(
        &self,
        system: &str,
        user_message: String,
        api_key: &str,
    ) -> Result<T> {
        let request = self.build_request(system, user_message);
        let text = self.send(&request, api_key).await?;
        parse_json_reply(&text)
    }
}

#[async_trait]
impl Interpreter for ClaudeClient {
    async fn extract_tokens(&self, snapshot: &CssSnapshot, api_key: &str) -> Result<DesignTokens> {
        self.complete_json(TOKENS_SYSTEM_PROMPT, build_tokens_prompt(snapshot), api_key)
            .await
    }

    async fn analyze_structure(
        &self,
        snapshot: &CssSnapshot,
        api_key: &str,
    ) -> Result<StructureAnalysis> {
        self.complete_json(STRUCTURE_SYSTEM_PROMPT, build_structure_prompt(snapshot), api_key)
            .await
    }
}

/// Remove a leading ```` ``` ````/```` ```json ```` fence and a trailing fence.
pub fn strip_code_fences(text: &str) -> String {
    let without_leading = LEADING_FENCE_RE.replace(text, "");
    TRAILING_FENCE_RE
        .replace(&without_leading, "")
        .trim()
        .to_string()
}

/// Decode a model reply, tolerating markdown fences around the JSON.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(&strip_code_fences(text)).map_err(|e| Error::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKENS_JSON: &str = r##"{
  "colors": {"primary": "#3b82f6", "background": "#ffffff", "surface": "#f8fafc", "text": "#0f172a", "border": "#e2e8f0"},
  "typography": {"fontFamily": "Inter, sans-serif", "fontSize": "16px", "fontWeight": "400", "lineHeight": "1.5"},
  "radius": "8px",
  "shadow": null,
  "spacing": "4px"
}"##;

    #[test]
    fn test_fenced_and_plain_parse_identically() {
        let plain: DesignTokens = parse_json_reply(TOKENS_JSON).unwrap();
        let fenced: DesignTokens = parse_json_reply(&format!("```json\n{}\n```", TOKENS_JSON)).unwrap();
        let bare_fence: DesignTokens = parse_json_reply(&format!("```\n{}\n```\n", TOKENS_JSON)).unwrap();
        assert_eq!(plain, fenced);
        assert_eq!(plain, bare_fence);
        assert_eq!(plain.colors.primary.as_deref(), Some("#3b82f6"));
    }

    #[test]
    fn test_reply_with_null_groups_parses() {
        let reply = "```json\n{\"colors\": null, \"typography\": null, \"radius\": \"4px\", \"shadow\": null, \"spacing\": \"8px\"}\n```";
        let tokens: DesignTokens = parse_json_reply(reply).unwrap();
        assert!(tokens.colors.primary.is_none());
        assert!(tokens.typography.font_size.is_none());
        assert_eq!(tokens.spacing.as_deref(), Some("8px"));
    }

    #[test]
    fn test_malformed_reply_is_parse_error() {
        let err = parse_json_reply::<DesignTokens>("Sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_build_request() {
        let client = ClaudeClient::new(ClaudeConfig::default());
        let request = client.build_request(TOKENS_SYSTEM_PROMPT, "URL: https://example.com/".into());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "claude-haiku-4-5-20251001");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "URL: https://example.com/");
        assert!(json["system"].as_str().unwrap().contains("design system expert"));
    }

    // Wiremock-based tests for actual HTTP calls
    mod http_tests {
        use super::*;
        use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

        fn client_for(server: &MockServer) -> ClaudeClient {
            ClaudeClient::new(ClaudeConfig {
                api_base: format!("{}/v1", server.uri()),
                ..Default::default()
            })
        }

        fn snapshot() -> CssSnapshot {
            CssSnapshot {
                url: "https://example.com/".into(),
                title: "Example".into(),
                stylesheet_rules: vec![".btn { border-radius: 8px; }".into()],
                ..Default::default()
            }
        }

        fn text_reply(text: &str) -> ResponseTemplate {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": text}],
                "stop_reason": "end_turn",
            }))
        }

        #[tokio::test]
        async fn test_extract_tokens_sends_headers_and_parses() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/v1/messages"))
                .and(matchers::header("x-api-key", "sk-ant-test"))
                .and(matchers::header("anthropic-version", ANTHROPIC_VERSION))
                .respond_with(text_reply(&format!("```json\n{}\n```", TOKENS_JSON)))
                .expect(1)
                .mount(&server)
                .await;

            let tokens = client_for(&server)
                .extract_tokens(&snapshot(), "sk-ant-test")
                .await
                .unwrap();
            assert_eq!(tokens.radius.as_deref(), Some("8px"));
            assert!(tokens.shadow.is_none());
        }

        #[tokio::test]
        async fn test_analyze_structure_request_body() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/v1/messages"))
                .respond_with(text_reply(
                    r#"{"components": ["button"], "layout": "flexbox", "cssArchitecture": "plain", "colorMode": "light-only", "complexity": "simple"}"#,
                ))
                .mount(&server)
                .await;

            let analysis = client_for(&server)
                .analyze_structure(&snapshot(), "sk-ant-test")
                .await
                .unwrap();
            assert_eq!(analysis.components, vec!["button"]);
            assert_eq!(analysis.layout.as_deref(), Some("flexbox"));

            let received = server.received_requests().await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
            assert_eq!(body["max_tokens"], 1024);
            assert!(body["system"].as_str().unwrap().contains("CSS architecture expert"));
            assert!(body["messages"][0]["content"]
                .as_str()
                .unwrap()
                .contains("CSS Rules (1 total, showing first 1):"));
        }

        #[tokio::test]
        async fn test_error_status_uses_service_message() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                    "type": "error",
                    "error": {"type": "authentication_error", "message": "invalid x-api-key"},
                })))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .extract_tokens(&snapshot(), "bad-key")
                .await
                .unwrap_err();
            assert!(matches!(&err, Error::Remote(_)));
            assert_eq!(err.to_string(), "invalid x-api-key");
        }

        #[tokio::test]
        async fn test_error_status_without_message() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .analyze_structure(&snapshot(), "sk-ant-test")
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Claude API error: 529");
        }

        #[tokio::test]
        async fn test_unparseable_reply() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .respond_with(text_reply("Here are your tokens: primary is blue."))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .extract_tokens(&snapshot(), "sk-ant-test")
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Parse(_)));
        }
    }
}
