//! 事件总线统一错误定义
//!
//! 仅覆盖基础设施层面的失败（存储、序列化、总线关闭等）。
//! 处理器失败不会以错误形式返回给 `publish` 调用方，而是体现在事件状态与死信队列中。
//!
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BusError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 事件存储 ---
    #[error("duplicate event: id={event_id}")]
    DuplicateEvent { event_id: String },
    #[error("event not found: id={event_id}")]
    NotFound { event_id: String },
    #[error("event store error: {reason}")]
    Store { reason: String },

    // --- 总线生命周期 ---
    #[error("event bus is closed")]
    Closed,
}

impl BusError {
    pub fn store(reason: impl Into<String>) -> Self {
        BusError::Store {
            reason: reason.into(),
        }
    }

    pub fn not_found(event_id: impl Into<String>) -> Self {
        BusError::NotFound {
            event_id: event_id.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type BusResult<T> = Result<T, BusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = BusError::not_found("e-1");
        assert_eq!(err.to_string(), "event not found: id=e-1");

        let err = BusError::DuplicateEvent {
            event_id: "e-2".into(),
        };
        assert_eq!(err.to_string(), "duplicate event: id=e-2");
    }

    #[test]
    fn serde_error_converts() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BusError = bad.into();
        assert!(matches!(err, BusError::Serde { .. }));
    }
}
