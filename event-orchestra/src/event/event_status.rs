use serde::{Deserialize, Serialize};
use std::fmt;

/// 事件生命周期状态
///
/// `Pending → Processing → (Failed → Processing)* → Completed | DeadLetter`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    /// 本轮投递失败，等待下一次重试
    Failed,
    DeadLetter,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "PENDING",
            EventStatus::Processing => "PROCESSING",
            EventStatus::Completed => "COMPLETED",
            EventStatus::Failed => "FAILED",
            EventStatus::DeadLetter => "DEAD_LETTER",
        }
    }

    /// 终态：不会再发生任何状态迁移
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::DeadLetter)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_screaming_snake_case() {
        let v = serde_json::to_value(EventStatus::DeadLetter).unwrap();
        assert_eq!(v, serde_json::json!("DEAD_LETTER"));

        let back: EventStatus = serde_json::from_value(serde_json::json!("PROCESSING")).unwrap();
        assert_eq!(back, EventStatus::Processing);
    }

    #[test]
    fn terminal_states() {
        assert!(EventStatus::Completed.is_terminal());
        assert!(EventStatus::DeadLetter.is_terminal());
        assert!(!EventStatus::Pending.is_terminal());
        assert!(!EventStatus::Processing.is_terminal());
        assert!(!EventStatus::Failed.is_terminal());
    }
}
