use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Per-minute request budget shared by clones of one provider.
/// Callers over budget wait for the next wall-clock minute; nothing is dropped or retried.
#[derive(Clone)]
pub struct RequestLimiter {
    budget: Arc<Mutex<MinuteBudget>>,
}

struct MinuteBudget {
    // Minutes since the epoch that `used` is booked against
    minute: u64,
    used: u32,
    limit: u32,
}

impl MinuteBudget {
    /// Books `cost` against `now_minute` if it fits.
    /// An empty minute admits any call, even one heavier than the whole budget.
    fn try_book(&mut self, cost: u32, now_minute: u64) -> bool {
        if now_minute > self.minute {
            self.minute = now_minute;
            self.used = 0;
        }
        if self.used == 0 || self.used + cost <= self.limit {
            self.used += cost;
            true
        } else {
            false
        }
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// Time left until the next minute starts, plus a little slack so the retry lands inside it.
fn until_next_minute(now_secs: u64) -> Duration {
    Duration::from_secs(60 - now_secs % 60) + Duration::from_millis(100)
}

impl RequestLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            budget: Arc::new(Mutex::new(MinuteBudget {
                minute: epoch_secs() / 60,
                used: 0,
                limit: limit.max(1),
            })),
        }
    }

    /// Waits until `cost` fits in the current minute's budget, then books it.
    /// `context` names the symbol or call for the saturation warning.
    pub async fn acquire(&self, cost: u32, context: &str) {
        loop {
            let (wait, used, limit) = {
                let mut budget = self.budget.lock().await;
                let now = epoch_secs();
                if budget.try_book(cost, now / 60) {
                    return;
                }
                (until_next_minute(now), budget.used, budget.limit)
            };

            log::warn!(
                "{}: request budget spent ({}/{} this minute), waiting {:.1}s",
                context,
                used,
                limit,
                wait.as_secs_f64()
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Weight consumed in the current minute.
    pub async fn used(&self) -> u32 {
        self.budget.lock().await.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(limit: u32) -> MinuteBudget {
        MinuteBudget {
            minute: 100,
            used: 0,
            limit,
        }
    }

    #[test]
    fn booking_stops_at_limit_until_next_minute() {
        let mut b = budget(3);
        assert!(b.try_book(2, 100));
        assert!(!b.try_book(2, 100));
        assert!(b.try_book(1, 100));
        assert_eq!(b.used, 3);

        assert!(b.try_book(2, 101));
        assert_eq!(b.used, 2);
        assert_eq!(b.minute, 101);
    }

    #[test]
    fn oversized_call_needs_an_empty_minute() {
        let mut b = budget(1);
        assert!(b.try_book(5, 100));
        assert!(!b.try_book(1, 100));
        assert!(b.try_book(5, 101));
    }

    #[test]
    fn wait_lands_after_the_boundary() {
        assert_eq!(until_next_minute(120), Duration::from_millis(60_100));
        assert_eq!(until_next_minute(179), Duration::from_millis(1_100));
    }

    #[tokio::test]
    async fn acquire_within_budget_does_not_wait() {
        let limiter = RequestLimiter::new(10);
        let start = std::time::Instant::now();
        for _ in 0..5 {
            limiter.acquire(2, "test").await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
        // A minute boundary may have reset the count in between
        assert!(limiter.used().await <= 10);
    }
}
