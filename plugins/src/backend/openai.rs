use async_trait::async_trait;
use dossier_core::config::GenerationConfig;
use dossier_core::error::GatewayError;
use dossier_core::gateway::{GenerationService, PromptContext};
use serde_json::{json, Value};

use super::http;

/// `POST {endpoint}/chat/completions` against any OpenAI-compatible server.
pub struct OpenAiGenerationService {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiGenerationService {
    /// The API key is read from the environment variable named by
    /// `cfg.api_key_env`; without one, requests are sent unauthenticated.
    pub fn new(cfg: &GenerationConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                target: "dossier.backend",
                env = %cfg.api_key_env,
                "no API key set for the generation endpoint"
            );
        }

        // The gateway owns the per-call timeout; the client bound is only a backstop.
        let http = http::client(cfg.timeout_ms.saturating_add(5_000))?;
        Ok(Self {
            http,
            url: format!("{}/chat/completions", cfg.endpoint.trim_end_matches('/')),
            api_key,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, prompt: &PromptContext) -> Value {
        let mut body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": prompt.system_prompt() },
                { "role": "user", "content": prompt.user_prompt() },
            ],
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl GenerationService for OpenAiGenerationService {
    fn name(&self) -> &str {
        "openai-chat"
    }

    async fn generate(&self, prompt: &PromptContext) -> Result<String, GatewayError> {
        tracing::debug!(
            target: "dossier.backend",
            url = %self.url,
            model = %self.model,
            task_id = %prompt.task_id,
            "chat completion request"
        );

        let mut req = self.http.post(&self.url).json(&self.request_body(prompt));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req
            .send()
            .await
            .map_err(|err| http::from_reqwest(err, &self.url))?;
        let value = http::success_json(resp).await?;
        completion_text(&value)
    }
}

fn completion_text(value: &Value) -> Result<String, GatewayError> {
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            GatewayError::MalformedResponse(format!(
                "no choices[0].message.content in response: {}",
                http::preview_body(&value.to_string())
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(endpoint: &str) -> GenerationConfig {
        GenerationConfig {
            endpoint: endpoint.to_string(),
            api_key_env: "DOSSIER_TEST_UNSET_KEY".to_string(),
            max_tokens: Some(512),
            ..GenerationConfig::default()
        }
    }

    fn prompt() -> PromptContext {
        PromptContext {
            task_id: "research".into(),
            role: "Market Researcher".into(),
            goal: "Collect data".into(),
            backstory: "Sourcing analyst".into(),
            description: "Collect data on robotics".into(),
            expected_output: "Raw data".into(),
            ..PromptContext::default()
        }
    }

    #[tokio::test]
    async fn test_generate_returns_message_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 512,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r##"{"choices":[{"message":{"role":"assistant","content":"# Data"}}]}"##)
            .create_async()
            .await;

        let service = OpenAiGenerationService::new(&config(&format!("{}/v1/", server.url())))
            .unwrap()
            .with_api_key("sk-test");
        let text = service.generate(&prompt()).await.unwrap();

        assert_eq!(text, "# Data");
        mock.assert_async().await;
    }

    #[test]
    fn test_request_body_carries_both_messages() {
        let service = OpenAiGenerationService::new(&config("http://localhost")).unwrap();
        let body = service.request_body(&prompt());

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(
            body["messages"][0]["content"],
            "You are Market Researcher.\nYour goal: Collect data\n\nBackground: Sourcing analyst"
        );
        assert_eq!(body["messages"][1]["role"], "user");
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("Collect data on robotics"));
        assert!(user.contains("Raw data"));
    }

    #[tokio::test]
    async fn test_server_error_is_service_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let service = OpenAiGenerationService::new(&config(&server.url())).unwrap();
        let err = service.generate(&prompt()).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_missing_content_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let service = OpenAiGenerationService::new(&config(&server.url())).unwrap();
        let err = service.generate(&prompt()).await.unwrap_err();
        assert_eq!(err.kind(), "MalformedResponse");
    }
}
