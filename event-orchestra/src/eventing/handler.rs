//! 事件处理器（EventHandler）
//!
//! 定义消费某类事件的处理逻辑与元信息（名称），以及按事件类型组织的订阅表。
//! 处理器以返回 `Err` 或 panic 表示失败，返回 `Ok(())` 表示成功。
//!
use crate::event::Event;
use async_trait::async_trait;
use dashmap::DashMap;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;

/// 事件处理器：处理某一类型的事件
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器名称（用于日志、重放报告与退订）
    fn handler_name(&self) -> &str;
    /// 处理事件
    async fn handle(&self, event: &Event) -> anyhow::Result<()>;
}

/// 将异步闭包适配为 `EventHandler`
///
/// 闭包拿到的是事件的克隆，因此无法持有总线内部事件的引用。
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> FnHandler<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn handler_name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        (self.f)(event.clone()).await
    }
}

/// 订阅表：事件类型 → 按注册顺序排列的处理器
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    by_type: DashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub(crate) fn register(&self, event_type: String, handler: Arc<dyn EventHandler>) {
        self.by_type.entry(event_type).or_default().push(handler);
    }

    /// 移除指定类型下所有同名处理器，返回移除数量
    pub(crate) fn remove(&self, event_type: &str, handler_name: &str) -> usize {
        let Some(mut list) = self.by_type.get_mut(event_type) else {
            return 0;
        };
        let before = list.len();
        list.retain(|h| h.handler_name() != handler_name);
        before - list.len()
    }

    /// 复制出当前处理器列表，调用方在 `.await` 期间不持有分片锁
    pub(crate) fn matching(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.by_type
            .get(event_type)
            .map(|list| list.value().clone())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, event_type: &str) -> usize {
        self.by_type.get(event_type).map_or(0, |list| list.len())
    }
}

/// 从 panic 负载中提取可读信息
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
