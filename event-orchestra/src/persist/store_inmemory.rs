//! 内存版事件存储（InMemoryEventStore）
//!
//! 以 `Vec` 保存插入顺序，辅以 ID → 下标索引：
//! - `append`/`update`/`get` 为 O(1)；
//! - `by_type` 线性扫描并保持插入顺序；
//! - 典型用途：测试环境、示例与无需持久化的进程内场景。

use crate::error::{BusError, BusResult as Result};
use crate::event::Event;
use crate::persist::EventStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    events: Vec<Event>,
    index: HashMap<String, usize>,
}

/// 简单的内存事件存储实现
#[derive(Default)]
pub struct InMemoryEventStore {
    inner: RwLock<Inner>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: &Event) -> Result<()> {
        let mut g = self.inner.write().await;
        if g.index.contains_key(event.id()) {
            return Err(BusError::DuplicateEvent {
                event_id: event.id().to_string(),
            });
        }
        let pos = g.events.len();
        g.index.insert(event.id().to_string(), pos);
        g.events.push(event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<()> {
        let mut g = self.inner.write().await;
        let Some(&pos) = g.index.get(event.id()) else {
            return Err(BusError::not_found(event.id()));
        };
        g.events[pos] = event.clone();
        Ok(())
    }

    async fn get(&self, event_id: &str) -> Result<Option<Event>> {
        let g = self.inner.read().await;
        Ok(g.index.get(event_id).map(|&pos| g.events[pos].clone()))
    }

    async fn by_type(&self, event_type: &str) -> Result<Vec<Event>> {
        let g = self.inner.read().await;
        Ok(g.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.inner.read().await.events.len())
    }
}
