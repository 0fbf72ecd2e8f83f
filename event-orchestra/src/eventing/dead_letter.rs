//! 死信队列（DeadLetterQueue）
//!
//! 按进入顺序保存重试耗尽的事件，仅提供查询。
//! 总线不会自动移除或重投死信，补救属于运维侧的显式操作。
//!
use crate::event::Event;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct DeadLetterQueue {
    entries: RwLock<Vec<Event>>,
}

impl DeadLetterQueue {
    pub(crate) async fn push(&self, event: Event) {
        self.entries.write().await.push(event);
    }

    pub async fn list(&self) -> Vec<Event> {
        self.entries.read().await.clone()
    }

    pub async fn get(&self, event_id: &str) -> Option<Event> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.id() == event_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn keeps_insertion_order() {
        let dlq = DeadLetterQueue::default();
        assert!(dlq.is_empty().await);

        let a = Event::new("t", json!(1));
        let b = Event::new("t", json!(2));
        dlq.push(a.clone()).await;
        dlq.push(b.clone()).await;

        assert_eq!(dlq.len().await, 2);
        assert_eq!(dlq.list().await, vec![a.clone(), b]);
        assert_eq!(dlq.get(a.id()).await, Some(a));
        assert!(dlq.get("missing").await.is_none());
    }
}
