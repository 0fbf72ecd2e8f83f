//! 事件存储（persist）
//!
//! 定义总线依赖的最小事件存储协议与内存实现：
//! - 以事件 ID 为键的追加日志，支持按 ID 查询；
//! - 按事件类型、以插入顺序取回事件，供重放使用。
//!
//! 持久化后端（数据库、文件等）由上层实现 `EventStore` 并注入到 `EventBus`。
//!
mod event_store;
mod store_inmemory;

pub use event_store::EventStore;
pub use store_inmemory::InMemoryEventStore;
