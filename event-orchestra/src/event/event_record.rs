use super::EventStatus;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

/// 未显式指定时的最大重试次数
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// 总线上的一条事件记录
///
/// 标识、类型、负载与关联 ID 在构造后不可变；状态与重试计数只由总线推进，
/// 处理器仅能拿到 `&Event`。
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct Event {
    /// 事件唯一标识符（ULID）
    #[builder(skip = Ulid::new().to_string())]
    id: String,
    /// 事件类型，用于路由到订阅者与过滤器
    #[builder(into)]
    event_type: String,
    /// 事件负载
    #[builder(default)]
    payload: Value,
    /// 关联 ID，未提供时生成新的标识
    #[builder(into, default = Ulid::new().to_string())]
    correlation_id: String,
    /// 因果 ID，指向触发本事件的上游事件
    #[builder(into)]
    causation_id: Option<String>,
    #[builder(skip)]
    status: EventStatus,
    /// 最大重试次数，0 表示首次失败即进入死信
    #[builder(default = DEFAULT_MAX_RETRIES)]
    max_retries: u32,
    #[builder(skip)]
    retry_count: u32,
    #[builder(skip = Utc::now())]
    created_at: DateTime<Utc>,
    #[builder(skip)]
    last_attempt_at: Option<DateTime<Utc>>,
    /// 最近一次处理失败的原因
    #[builder(skip)]
    last_error: Option<String>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Event::builder()
            .event_type(event_type)
            .payload(payload)
            .build()
    }

    /// 由上游事件派生出的新事件：沿用其关联 ID，并以其 ID 作为因果 ID
    pub fn caused_by(parent: &Event, event_type: impl Into<String>, payload: Value) -> Self {
        Event::builder()
            .event_type(event_type)
            .payload(payload)
            .correlation_id(parent.correlation_id.clone())
            .causation_id(parent.id.clone())
            .build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ---- 状态迁移（仅总线内部使用） ----

    pub(crate) fn begin_attempt(&mut self) {
        self.status = EventStatus::Processing;
        self.last_attempt_at = Some(Utc::now());
    }

    pub(crate) fn complete(&mut self) {
        self.status = EventStatus::Completed;
    }

    /// 记录一次失败：还有重试额度时进入 `Failed` 并递增计数，否则进入 `DeadLetter`。
    /// `retry_count` 永远不会超过 `max_retries`。
    pub(crate) fn record_failure(&mut self, reason: impl Into<String>) -> EventStatus {
        self.last_error = Some(reason.into());
        if self.retry_count < self.max_retries {
            self.retry_count += 1;
            self.status = EventStatus::Failed;
        } else {
            self.status = EventStatus::DeadLetter;
        }
        self.status
    }
}
