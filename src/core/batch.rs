use crate::config::RateLimitConfig;
use crate::domain::ports::RateLimiter;
use async_trait::async_trait;
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;

/// Fixed-size batches with a constant pause between them.
#[derive(Debug, Clone)]
pub struct FixedWindowLimiter {
    batch_size: usize,
    delay: Duration,
}

impl FixedWindowLimiter {
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.batch_size, config.delay())
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn pause(&self, completed_batch: usize) {
        tracing::debug!(
            "⏳ Batch {} done, pausing {:?} before the next",
            completed_batch,
            self.delay
        );
        tokio::time::sleep(self.delay).await;
    }
}

/// 分批執行查詢：同一批內並行，批次之間依限流器暫停。
///
/// `op` receives each item together with its input index. Results are placed
/// back into the slot of that index, so the output has the same length and
/// order as `items` no matter in which order lookups complete.
pub async fn run_batched<T, O, F, Fut>(items: Vec<T>, limiter: &dyn RateLimiter, op: F) -> Vec<O>
where
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = O>,
{
    let total = items.len();
    let batch_size = limiter.batch_size().max(1);
    let batch_count = total.div_ceil(batch_size);

    let mut slots: Vec<Option<O>> = std::iter::repeat_with(|| None).take(total).collect();
    let mut pending = items.into_iter().enumerate().peekable();
    let mut batch_number = 0;

    while pending.peek().is_some() {
        batch_number += 1;
        let batch: Vec<_> = pending
            .by_ref()
            .take(batch_size)
            .map(|(index, item)| {
                let lookup = op(index, item);
                async move { (index, lookup.await) }
            })
            .collect();

        tracing::debug!(
            "📦 Batch {}/{}: {} lookups",
            batch_number,
            batch_count,
            batch.len()
        );

        for (index, output) in join_all(batch).await {
            slots[index] = Some(output);
        }

        if pending.peek().is_some() {
            limiter.pause(batch_number).await;
        }
    }

    let results: Vec<O> = slots.into_iter().flatten().collect();
    debug_assert_eq!(results.len(), total);
    results
}
