//! 重试策略（RetryPolicy）
//!
//! 指数退避：`min(base_delay * 2^retry_count, max_delay)`，全程饱和运算，
//! 不会因重试次数过大而溢出。
//!
use super::config::duration_ms;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// 退避基数
    #[builder(default = Duration::from_millis(100))]
    #[serde(with = "duration_ms")]
    pub base_delay: Duration,
    /// 单次退避上限
    #[builder(default = Duration::from_secs(30))]
    #[serde(with = "duration_ms")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// 不等待立即重试，常用于测试
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// 第 `retry_count` 次重试前的等待时长
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let factor = 1_u32.checked_shl(retry_count).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_capped() {
        let policy = RetryPolicy::builder()
            .base_delay(Duration::from_millis(10))
            .max_delay(Duration::from_millis(100))
            .build();

        assert_eq!(policy.backoff(0), Duration::from_millis(10));
        assert_eq!(policy.backoff(1), Duration::from_millis(20));
        assert_eq!(policy.backoff(2), Duration::from_millis(40));
        assert_eq!(policy.backoff(3), Duration::from_millis(80));
        assert_eq!(policy.backoff(4), Duration::from_millis(100));
        assert_eq!(policy.backoff(64), Duration::from_millis(100));
    }

    #[test]
    fn huge_counts_saturate() {
        let policy = RetryPolicy::builder()
            .base_delay(Duration::from_secs(u64::MAX / 2))
            .max_delay(Duration::MAX)
            .build();
        assert_eq!(policy.backoff(31), Duration::MAX);
    }

    #[test]
    fn immediate_never_waits() {
        let policy = RetryPolicy::immediate();
        assert_eq!(policy.backoff(0), Duration::ZERO);
        assert_eq!(policy.backoff(10), Duration::ZERO);
    }
}
