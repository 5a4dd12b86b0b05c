use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::executor::traits::RetryStrategyPlugin;

use super::budget::CallBudget;
use super::prompt::PromptContext;

/// External text-generation backend.
#[async_trait]
pub trait GenerationService: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &PromptContext) -> Result<String, GatewayError>;
}

/// Text returned by a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub text: String,
    pub attempts: u32,
}

/// Every generation call goes through here: per-call timeout, optional
/// retry of transient failures, and a per-gateway call budget.
pub struct GenerationGateway {
    service: Arc<dyn GenerationService>,
    timeout: Duration,
    retry: Option<Arc<dyn RetryStrategyPlugin>>,
    budget: CallBudget,
}

impl GenerationGateway {
    pub fn new(service: Arc<dyn GenerationService>, timeout: Duration) -> Self {
        Self {
            service,
            timeout,
            retry: None,
            budget: CallBudget::unlimited(),
        }
    }

    pub fn with_retry(mut self, strategy: Arc<dyn RetryStrategyPlugin>) -> Self {
        self.retry = Some(strategy);
        self
    }

    /// `0` means unlimited.
    pub fn with_budget(mut self, max_calls: u32) -> Self {
        self.budget = CallBudget::new(max_calls);
        self
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    pub fn calls_made(&self) -> u32 {
        self.budget.used()
    }

    pub async fn invoke(&self, prompt: &PromptContext) -> Result<Invocation, GatewayError> {
        let mut attempt: u32 = 0;

        loop {
            self.budget.acquire()?;
            attempt += 1;

            tracing::debug!(
                target: "dossier.gateway",
                service = self.service.name(),
                task_id = %prompt.task_id,
                attempt,
                "generation call"
            );

            let outcome = match tokio::time::timeout(self.timeout, self.service.generate(prompt))
                .await
            {
                Ok(result) => result.and_then(check_text),
                Err(_) => Err(GatewayError::ServiceUnavailable(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                ))),
            };

            let err = match outcome {
                Ok(text) => {
                    return Ok(Invocation {
                        text,
                        attempts: attempt,
                    })
                }
                Err(err) => err,
            };

            let Some(strategy) = self.retry.as_ref() else {
                return Err(err);
            };
            let message = err.to_string();
            if !err.is_retryable() || !strategy.should_retry(attempt, &message) {
                return Err(err);
            }
            let Some(delay) = strategy.next_delay(attempt, &message) else {
                return Err(err);
            };

            tracing::warn!(
                target: "dossier.gateway",
                task_id = %prompt.task_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying generation call"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn check_text(text: String) -> Result<String, GatewayError> {
    if text.trim().is_empty() {
        return Err(GatewayError::MalformedResponse(
            "empty response body".to_string(),
        ));
    }
    if text.contains('\0') {
        return Err(GatewayError::MalformedResponse(
            "response is not text".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerationService;

    struct FixedRetry(u32);

    impl RetryStrategyPlugin for FixedRetry {
        fn name(&self) -> &str {
            "fixed"
        }

        fn next_delay(&self, _attempt: u32, _error: &str) -> Option<Duration> {
            Some(Duration::from_millis(10))
        }

        fn max_attempts(&self) -> u32 {
            self.0
        }
    }

    fn prompt(task_id: &str) -> PromptContext {
        PromptContext {
            task_id: task_id.to_string(),
            description: "do it".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let service = Arc::new(
            ScriptedGenerationService::new()
                .fail("t", GatewayError::ServiceUnavailable("503".into()))
                .respond("t", "late"),
        );
        let gateway = GenerationGateway::new(service.clone(), Duration::from_secs(5));

        let err = gateway.invoke(&prompt("t")).await.unwrap_err();
        assert!(matches!(err, GatewayError::ServiceUnavailable(_)));
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_service_unavailable() {
        let service = Arc::new(
            ScriptedGenerationService::new()
                .fail("t", GatewayError::ServiceUnavailable("503".into()))
                .respond("t", "ok"),
        );
        let gateway = GenerationGateway::new(service.clone(), Duration::from_secs(5))
            .with_retry(Arc::new(FixedRetry(3)));

        let out = gateway.invoke(&prompt("t")).await.unwrap();
        assert_eq!(out.text, "ok");
        assert_eq!(out.attempts, 2);
    }

    #[tokio::test]
    async fn test_malformed_is_not_retried() {
        let service = Arc::new(
            ScriptedGenerationService::new()
                .respond("t", "   ")
                .respond("t", "ok"),
        );
        let gateway = GenerationGateway::new(service.clone(), Duration::from_secs(5))
            .with_retry(Arc::new(FixedRetry(3)));

        let err = gateway.invoke(&prompt("t")).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_service_unavailable() {
        let service = Arc::new(
            ScriptedGenerationService::new()
                .with_delay(Duration::from_secs(60))
                .respond("t", "too late"),
        );
        let gateway = GenerationGateway::new(service, Duration::from_secs(1));

        let err = gateway.invoke(&prompt("t")).await.unwrap_err();
        assert!(matches!(err, GatewayError::ServiceUnavailable(ref m) if m.contains("timed out")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_caps_retries() {
        let service = Arc::new(
            ScriptedGenerationService::new()
                .fail("t", GatewayError::ServiceUnavailable("1".into()))
                .fail("t", GatewayError::ServiceUnavailable("2".into()))
                .respond("t", "ok"),
        );
        let gateway = GenerationGateway::new(service.clone(), Duration::from_secs(5))
            .with_retry(Arc::new(FixedRetry(5)))
            .with_budget(2);

        let err = gateway.invoke(&prompt("t")).await.unwrap_err();
        assert_eq!(err, GatewayError::BudgetExhausted { limit: 2 });
        assert_eq!(service.call_count(), 2);
        assert_eq!(gateway.calls_made(), 2);
    }
}
