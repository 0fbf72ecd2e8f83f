//! 重放结果
//!
//! 重放是只读的旁路：不会修改已存储事件的状态与重试计数，失败也不会重试，
//! 需要逐条追踪时由调用方检查 `ReplayReport`。
//!
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFailure {
    pub event_id: String,
    pub handler: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub event_type: String,
    /// 被重放的事件数（与处理结果无关）
    pub replayed: usize,
    pub failures: Vec<ReplayFailure>,
}

impl ReplayReport {
    pub(crate) fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            replayed: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// 至少一个处理器失败的事件 ID，按首次失败顺序去重
    pub fn failed_event_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for f in &self.failures {
            if !ids.contains(&f.event_id.as_str()) {
                ids.push(&f.event_id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(event_id: &str, handler: &str) -> ReplayFailure {
        ReplayFailure {
            event_id: event_id.into(),
            handler: handler.into(),
            reason: "boom".into(),
        }
    }

    #[test]
    fn failed_ids_are_deduplicated() {
        let mut report = ReplayReport::new("t");
        assert!(report.is_clean());

        report.replayed = 3;
        report.failures.push(failure("e1", "a"));
        report.failures.push(failure("e1", "b"));
        report.failures.push(failure("e3", "a"));

        assert!(!report.is_clean());
        assert_eq!(report.failed_event_ids(), vec!["e1", "e3"]);
    }
}
