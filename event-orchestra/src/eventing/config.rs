//! 事件总线配置
//!
//! 所有时长在序列化形式中以毫秒整数表示，便于从 JSON/TOML 等配置源加载。
//!
use super::RetryPolicy;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 事件总线配置
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// 失败后的退避策略
    #[builder(default)]
    pub retry: RetryPolicy,
    /// 单个处理器单次调用的超时，超时视为失败；`None` 表示不限制
    #[serde(with = "option_duration_ms")]
    pub handler_timeout: Option<Duration>,
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

pub(crate) mod option_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let cfg = EventBusConfig::default();
        assert_eq!(cfg.retry, RetryPolicy::default());
        assert_eq!(cfg.retry.base_delay, Duration::from_millis(100));
        assert_eq!(cfg.retry.max_delay, Duration::from_secs(30));
        assert!(cfg.handler_timeout.is_none());
    }

    #[test]
    fn loads_from_json_in_millis() {
        let cfg: EventBusConfig = serde_json::from_value(json!({
            "retry": { "base_delay": 5, "max_delay": 250 },
            "handler_timeout": 1000
        }))
        .unwrap();
        assert_eq!(cfg.retry.base_delay, Duration::from_millis(5));
        assert_eq!(cfg.retry.max_delay, Duration::from_millis(250));
        assert_eq!(cfg.handler_timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg: EventBusConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg, EventBusConfig::default());

        let out = serde_json::to_value(cfg).unwrap();
        assert_eq!(out["retry"]["base_delay"], json!(100));
        assert_eq!(out["handler_timeout"], json!(null));
    }
}
