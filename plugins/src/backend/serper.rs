use async_trait::async_trait;
use dossier_core::config::SearchConfig;
use dossier_core::error::GatewayError;
use dossier_core::gateway::{SearchHit, SearchService};
use serde_json::{json, Value};

use super::http;

/// Serper-style JSON search plus plain HTTP page scraping.
pub struct SerperSearchService {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    scrape_max_chars: usize,
}

impl SerperSearchService {
    pub fn new(cfg: &SearchConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                target: "dossier.backend",
                env = %cfg.api_key_env,
                "no API key set for the search endpoint"
            );
        }

        Ok(Self {
            http: http::client(cfg.timeout_ms.saturating_add(5_000))?,
            endpoint: cfg.endpoint.clone(),
            api_key,
            scrape_max_chars: cfg.scrape_max_chars,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl SearchService for SerperSearchService {
    fn name(&self) -> &str {
        "serper"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, GatewayError> {
        let mut req = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "q": query, "num": limit }));
        if let Some(key) = &self.api_key {
            req = req.header("X-API-KEY", key);
        }
        let resp = req
            .send()
            .await
            .map_err(|err| http::from_reqwest(err, &self.endpoint))?;
        let value = http::success_json(resp).await?;
        let hits = organic_hits(&value)?;

        tracing::debug!(target: "dossier.backend", query, hits = hits.len(), "search results");
        Ok(hits.into_iter().take(limit).collect())
    }

    async fn scrape(&self, url: &str) -> Result<String, GatewayError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| http::from_reqwest(err, url))?;
        let html = http::success_text(resp).await?;
        let text = html2text::from_read(html.as_bytes(), 100);
        Ok(truncate_chars(text.trim(), self.scrape_max_chars))
    }
}

fn organic_hits(value: &Value) -> Result<Vec<SearchHit>, GatewayError> {
    let Some(organic) = value.get("organic") else {
        return Ok(Vec::new());
    };
    serde_json::from_value::<Vec<SearchHit>>(organic.clone())
        .map_err(|err| GatewayError::MalformedResponse(format!("unexpected search results: {err}")))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(endpoint: String) -> SearchConfig {
        SearchConfig {
            endpoint,
            api_key_env: "DOSSIER_TEST_UNSET_KEY".to_string(),
            scrape_max_chars: 20,
            ..SearchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_search_parses_organic_hits() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .match_header("x-api-key", "serper-key")
            .match_body(Matcher::PartialJson(json!({ "q": "robotics market EU" })))
            .with_status(200)
            .with_body(
                r#"{"organic":[
                    {"title":"Robotics 2024","link":"https://a.example","snippet":"Growth 12%"},
                    {"title":"No snippet","link":"https://b.example"},
                    {"title":"Third","link":"https://c.example","snippet":"x"}
                ]}"#,
            )
            .create_async()
            .await;

        let service = SerperSearchService::new(&config(format!("{}/search", server.url())))
            .unwrap()
            .with_api_key("serper-key");
        let hits = service.search("robotics market EU", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Robotics 2024");
        assert_eq!(hits[1].snippet, "");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_without_organic_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(200)
            .with_body(r#"{"searchParameters":{}}"#)
            .create_async()
            .await;

        let service = SerperSearchService::new(&config(format!("{}/search", server.url()))).unwrap();
        assert!(service.search("nothing", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scrape_converts_and_truncates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><p>Market share of leading vendors grew again</p></body></html>")
            .create_async()
            .await;

        let service = SerperSearchService::new(&config(format!("{}/search", server.url()))).unwrap();
        let text = service
            .scrape(&format!("{}/page", server.url()))
            .await
            .unwrap();

        assert!(text.starts_with("Market share"));
        assert!(!text.contains("<p>"));
        assert_eq!(text.chars().count(), 21);
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("ação", 2), "aç…");
        assert_eq!(truncate_chars("abc", 5), "abc");
    }
}
