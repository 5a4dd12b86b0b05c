use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::GatewayError;

/// Hard cap on the number of calls made through one gateway.
#[derive(Debug, Default)]
pub struct CallBudget {
    limit: Option<u32>,
    used: AtomicU32,
}

impl CallBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// `0` means unlimited.
    pub fn new(limit: u32) -> Self {
        Self {
            limit: (limit > 0).then_some(limit),
            used: AtomicU32::new(0),
        }
    }

    /// Reserve one call.
    pub fn acquire(&self) -> Result<(), GatewayError> {
        let Some(limit) = self.limit else {
            self.used.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        };

        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < limit).then_some(used + 1)
            })
            .map(|_| ())
            .map_err(|_| GatewayError::BudgetExhausted { limit })
    }

    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }
}

/// Minimum spacing between consecutive calls.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// Wait until `interval` has passed since the previous call.
    pub async fn wait_turn(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_exhausts() {
        let budget = CallBudget::new(2);
        assert!(budget.acquire().is_ok());
        assert!(budget.acquire().is_ok());
        assert_eq!(
            budget.acquire(),
            Err(GatewayError::BudgetExhausted { limit: 2 })
        );
        assert_eq!(budget.used(), 2);
    }

    #[test]
    fn test_zero_means_unlimited() {
        let budget = CallBudget::new(0);
        for _ in 0..100 {
            budget.acquire().unwrap();
        }
        assert_eq!(budget.limit(), None);
        assert_eq!(budget.used(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_spaces_calls() {
        let throttle = Throttle::new(Duration::from_millis(500));
        let start = Instant::now();
        throttle.wait_turn().await;
        throttle.wait_turn().await;
        throttle.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }
}
