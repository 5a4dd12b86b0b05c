use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

use super::budget::{CallBudget, Throttle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// External web search and page scrape backend.
#[async_trait]
pub trait SearchService: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, GatewayError>;

    /// Page text for `url`.
    async fn scrape(&self, url: &str) -> Result<String, GatewayError>;
}

/// Search and scrape calls share one budget and one minimum interval.
pub struct SearchGateway {
    service: Arc<dyn SearchService>,
    timeout: Duration,
    budget: CallBudget,
    throttle: Throttle,
    results_per_query: usize,
}

impl SearchGateway {
    pub fn new(service: Arc<dyn SearchService>, timeout: Duration) -> Self {
        Self {
            service,
            timeout,
            budget: CallBudget::unlimited(),
            throttle: Throttle::new(Duration::ZERO),
            results_per_query: 5,
        }
    }

    pub fn with_budget(mut self, max_calls: u32) -> Self {
        self.budget = CallBudget::new(max_calls);
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.throttle = Throttle::new(interval);
        self
    }

    pub fn with_results_per_query(mut self, n: usize) -> Self {
        self.results_per_query = n.max(1);
        self
    }

    pub fn calls_made(&self) -> u32 {
        self.budget.used()
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, GatewayError> {
        self.budget.acquire()?;
        self.throttle.wait_turn().await;
        tracing::debug!(target: "dossier.search", service = self.service.name(), query, "search");

        let limit = self.results_per_query;
        let hits = self
            .bounded(self.service.search(query, limit))
            .await?;
        Ok(hits.into_iter().take(limit).collect())
    }

    pub async fn scrape(&self, url: &str) -> Result<String, GatewayError> {
        self.budget.acquire()?;
        self.throttle.wait_turn().await;
        tracing::debug!(target: "dossier.search", service = self.service.name(), url, "scrape");

        self.bounded(self.service.scrape(url)).await
    }

    async fn bounded<F, T>(&self, call: F) -> Result<T, GatewayError>
    where
        F: std::future::Future<Output = Result<T, GatewayError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                GatewayError::ServiceUnavailable(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })?
    }
}
