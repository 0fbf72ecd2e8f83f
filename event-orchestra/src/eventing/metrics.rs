//! 事件计数器
//!
//! 只增不减的原始计数，生命周期与所属 `EventBus` 一致；
//! 聚合、窗口等时序能力由外部系统基于快照实现。
//!
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Metrics {
    events_published: AtomicU64,
    events_processed: AtomicU64,
    events_failed: AtomicU64,
    events_filtered: AtomicU64,
    events_retried: AtomicU64,
    events_replayed: AtomicU64,
}

impl Metrics {
    pub(crate) fn record_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.events_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_filtered(&self) {
        self.events_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retried(&self) {
        self.events_retried.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replayed(&self, n: u64) {
        self.events_replayed.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_published: self.events_published.load(Ordering::Relaxed),
            events_processed: self.events_processed.load(Ordering::Relaxed),
            events_failed: self.events_failed.load(Ordering::Relaxed),
            events_filtered: self.events_filtered.load(Ordering::Relaxed),
            events_retried: self.events_retried.load(Ordering::Relaxed),
            events_replayed: self.events_replayed.load(Ordering::Relaxed),
        }
    }
}

/// 计数器快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// 每次成功入库的 `publish` 计 1
    pub events_published: u64,
    /// 所有处理器（可能经重试后）全部成功
    pub events_processed: u64,
    /// 进入死信队列
    pub events_failed: u64,
    /// 被过滤器拦截
    pub events_filtered: u64,
    /// 每次安排重试计 1
    pub events_retried: u64,
    /// 重放过的事件数
    pub events_replayed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn snapshot_reflects_increments() {
        let m = Metrics::default();
        m.record_published();
        m.record_published();
        m.record_processed();
        m.record_failed();
        m.record_filtered();
        m.record_retried();
        m.record_replayed(3);

        assert_eq!(
            m.snapshot(),
            MetricsSnapshot {
                events_published: 2,
                events_processed: 1,
                events_failed: 1,
                events_filtered: 1,
                events_retried: 1,
                events_replayed: 3,
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_increments_are_not_lost() {
        let m = Arc::new(Metrics::default());
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let m = m.clone();
                tokio::spawn(async move {
                    for _ in 0..500 {
                        m.record_published();
                    }
                })
            })
            .collect();
        for t in tasks {
            t.await.unwrap();
        }
        assert_eq!(m.snapshot().events_published, 8_000);
    }
}
