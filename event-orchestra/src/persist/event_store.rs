use crate::{error::BusResult as Result, event::Event};
use async_trait::async_trait;
use std::sync::Arc;

/// 事件存储：总线是唯一写入方
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 追加新事件；ID 已存在时返回 `BusError::DuplicateEvent`
    async fn append(&self, event: &Event) -> Result<()>;

    /// 以最新状态覆盖已存在的事件；ID 不存在时返回 `BusError::NotFound`
    async fn update(&self, event: &Event) -> Result<()>;

    async fn get(&self, event_id: &str) -> Result<Option<Event>>;

    /// 按插入顺序返回指定类型的全部事件
    async fn by_type(&self, event_type: &str) -> Result<Vec<Event>>;

    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

#[async_trait]
impl<T> EventStore for Arc<T>
where
    T: EventStore + ?Sized,
{
    async fn append(&self, event: &Event) -> Result<()> {
        (**self).append(event).await
    }

    async fn update(&self, event: &Event) -> Result<()> {
        (**self).update(event).await
    }

    async fn get(&self, event_id: &str) -> Result<Option<Event>> {
        (**self).get(event_id).await
    }

    async fn by_type(&self, event_type: &str) -> Result<Vec<Event>> {
        (**self).by_type(event_type).await
    }

    async fn len(&self) -> Result<usize> {
        (**self).len().await
    }
}
