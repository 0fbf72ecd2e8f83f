//! 事件子系统（eventing）
//!
//! 提供进程内事件编排的运行时：
//! - `EventBus`：发布/订阅门面，负责过滤、重试、死信与重放；
//! - `EventHandler`：对某类事件进行消费处理；
//! - `EventFilter` / `FilterChain`：投递前的按类型谓词；
//! - `RetryPolicy`：失败后的指数退避；
//! - `DeadLetterQueue`：重试耗尽的事件；
//! - `MetricsSnapshot`：发布/处理/失败计数。
//!
pub mod bus;
pub mod config;
pub mod dead_letter;
pub mod filter;
pub mod handler;
pub mod metrics;
pub mod replay;
pub mod retry;

pub use bus::EventBus;
pub use config::EventBusConfig;
pub use dead_letter::DeadLetterQueue;
pub use filter::{EventFilter, FilterChain, PredicateFilter};
pub use handler::{EventHandler, FnHandler};
pub use metrics::MetricsSnapshot;
pub use replay::{ReplayFailure, ReplayReport};
pub use retry::RetryPolicy;
