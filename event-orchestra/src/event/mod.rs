//! 事件模型（Event）
//!
//! 定义在总线上流转的事件记录及其生命周期状态。

mod event_record;
mod event_status;

pub use event_record::{DEFAULT_MAX_RETRIES, Event};
pub use event_status::EventStatus;
