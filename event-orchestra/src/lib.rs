//! 进程内事件编排总线（event-orchestra）
//!
//! 提供以事件类型为路由键的发布/订阅调度器：
//! - 事件模型（`event`）：标识、关联/因果 ID、状态与重试计数；
//! - 事件存储（`persist`）：追加日志协议与内存实现，支撑重放；
//! - 事件系统（`eventing`）：过滤链、重试退避、死信队列、计数器与 `EventBus` 门面。
//!
//! 总线需显式构造并以 `Arc<EventBus>` 在生产者与消费者之间传递，
//! 不提供全局单例；计数器随总线实例创建与销毁。
//!
//! 典型用法：
//! 1. `EventBus::builder()` 构造总线，可注入自定义 `EventStore` 与 `EventBusConfig`；
//! 2. `subscribe` 注册处理器，`add_filter` 注册过滤器；
//! 3. `publish` 发布事件并取得其终态；
//! 4. 轮询 `get_metrics` 与 `dead_letters` 监控健康状况，必要时 `replay_events` 重放。
//!
pub mod error;
pub mod event;
pub mod eventing;
pub mod persist;

pub use error::{BusError, BusResult};
pub use event::{DEFAULT_MAX_RETRIES, Event, EventStatus};
pub use eventing::{
    DeadLetterQueue, EventBus, EventBusConfig, EventFilter, EventHandler, MetricsSnapshot,
    ReplayReport, RetryPolicy,
};
pub use persist::{EventStore, InMemoryEventStore};
