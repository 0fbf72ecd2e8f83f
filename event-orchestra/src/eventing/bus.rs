//! 事件总线（EventBus）
//!
//! 所有事件流量的唯一入口，组合事件存储、订阅表、过滤链、重试执行、死信队列与计数器：
//! - `publish`：入库 → 计数 → 过滤 → 按重试策略投递给全部处理器，直到终态；
//! - `replay_events`：将已存储的某类事件按发布顺序重新交给当前处理器，不改动原事件；
//! - `get_metrics` / `dead_letters`：供运维轮询健康状况。
//!
//! 处理器的失败不会以 `Err` 形式返回给 `publish` 调用方，只体现在事件的
//! `DeadLetter` 状态与死信队列中；`Err` 仅表示存储失败或总线已关闭。
//!
use super::config::EventBusConfig;
use super::dead_letter::DeadLetterQueue;
use super::filter::{EventFilter, FilterRegistry, PredicateFilter};
use super::handler::{EventHandler, FnHandler, HandlerRegistry, panic_message};
use super::metrics::{Metrics, MetricsSnapshot};
use super::replay::{ReplayFailure, ReplayReport};
use crate::error::{BusError, BusResult as Result};
use crate::event::{Event, EventStatus};
use crate::persist::{EventStore, InMemoryEventStore};
use bon::bon;
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub struct EventBus {
    store: Arc<dyn EventStore>,
    handlers: HandlerRegistry,
    filters: FilterRegistry,
    dead_letters: DeadLetterQueue,
    metrics: Metrics,
    config: EventBusConfig,
    shutdown: CancellationToken,
}

#[bon]
impl EventBus {
    /// 未注入存储时使用 `InMemoryEventStore`
    #[builder]
    pub fn new(
        store: Option<Arc<dyn EventStore>>,
        #[builder(default)] config: EventBusConfig,
    ) -> Self {
        Self {
            store: store.unwrap_or_else(|| Arc::new(InMemoryEventStore::new())),
            handlers: HandlerRegistry::default(),
            filters: FilterRegistry::default(),
            dead_letters: DeadLetterQueue::default(),
            metrics: Metrics::default(),
            config,
            shutdown: CancellationToken::new(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl EventBus {
    // ---- 订阅 ----

    /// 为事件类型注册处理器；同一类型可注册多个，按注册顺序调用
    pub fn subscribe(&self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let event_type = event_type.into();
        debug!(
            event_type = %event_type,
            handler = handler.handler_name(),
            "handler subscribed"
        );
        self.handlers.register(event_type, handler);
    }

    pub fn subscribe_fn<F, Fut>(
        &self,
        event_type: impl Into<String>,
        name: impl Into<String>,
        f: F,
    ) where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.subscribe(event_type, Arc::new(FnHandler::new(name, f)));
    }

    /// 移除指定类型下所有同名处理器，返回移除数量
    pub fn unsubscribe(&self, event_type: &str, handler_name: &str) -> usize {
        self.handlers.remove(event_type, handler_name)
    }

    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers.count(event_type)
    }

    // ---- 过滤 ----

    pub fn add_filter<F>(&self, event_type: impl Into<String>, predicate: F)
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.add_event_filter(event_type, Arc::new(PredicateFilter::new(predicate)));
    }

    pub fn add_event_filter(&self, event_type: impl Into<String>, filter: Arc<dyn EventFilter>) {
        self.filters.register(event_type.into(), filter);
    }

    // ---- 发布 ----

    /// 发布事件并等待其到达终态（`Completed` 或 `DeadLetter`），返回最终的事件
    ///
    /// 需要“发后即忘”语义时，由调用方将其放入独立任务中执行。
    /// 任务被取消时，事件保持最近一次已写入存储的状态。
    #[instrument(
        skip_all,
        fields(
            event_id = %event.id(),
            event_type = %event.event_type(),
            correlation_id = %event.correlation_id(),
        )
    )]
    pub async fn publish(&self, mut event: Event) -> Result<Event> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        self.store.append(&event).await?;
        self.metrics.record_published();

        if !self.filters.allows(&event) {
            // 被过滤不是失败
            event.complete();
            self.store.update(&event).await?;
            self.metrics.record_filtered();
            debug!("event filtered out");
            return Ok(event);
        }

        self.dispatch(event).await
    }

    async fn dispatch(&self, mut event: Event) -> Result<Event> {
        loop {
            event.begin_attempt();
            self.store.update(&event).await?;

            let handlers = self.handlers.matching(event.event_type());
            let mut failures: Vec<String> = Vec::new();
            for handler in &handlers {
                if let Err(reason) = self.invoke(handler.as_ref(), &event).await {
                    warn!(
                        handler = handler.handler_name(),
                        retry_count = event.retry_count(),
                        reason = %reason,
                        "handler failed"
                    );
                    failures.push(format!("{}: {}", handler.handler_name(), reason));
                }
            }

            if failures.is_empty() {
                event.complete();
                self.store.update(&event).await?;
                self.metrics.record_processed();
                debug!(
                    handlers = handlers.len(),
                    retry_count = event.retry_count(),
                    "event completed"
                );
                return Ok(event);
            }

            match event.record_failure(failures.join("; ")) {
                EventStatus::DeadLetter => {
                    // 死信与计数先于存储写入，存储失败时事件仍可被轮询到
                    self.dead_letters.push(event.clone()).await;
                    self.metrics.record_failed();
                    warn!(
                        retry_count = event.retry_count(),
                        max_retries = event.max_retries(),
                        "retries exhausted, event dead-lettered"
                    );
                    self.store.update(&event).await?;
                    return Ok(event);
                }
                _ => {
                    self.store.update(&event).await?;
                    self.metrics.record_retried();
                    let delay = self.config.retry.backoff(event.retry_count());
                    debug!(
                        retry_count = event.retry_count(),
                        delay_ms = delay.as_millis() as u64,
                        "retry scheduled"
                    );
                    tokio::select! {
                        _ = self.shutdown.cancelled() => {
                            warn!("bus closed during backoff, retry abandoned");
                            return Err(BusError::Closed);
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// 调用单个处理器：`Err`、panic 与超时都折算为失败原因
    async fn invoke(
        &self,
        handler: &dyn EventHandler,
        event: &Event,
    ) -> std::result::Result<(), String> {
        let call = AssertUnwindSafe(handler.handle(event)).catch_unwind();
        let outcome = match self.config.handler_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(format!("timed out after {}ms", limit.as_millis())),
            },
            None => call.await,
        };

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(format!("{err:#}")),
            Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
    }

    // ---- 重放 ----

    /// 重放指定类型的全部已存储事件，返回重放的事件数
    pub async fn replay_events(&self, event_type: &str) -> Result<usize> {
        Ok(self.replay(event_type).await?.replayed)
    }

    /// 与 `replay_events` 相同，但返回逐处理器的失败明细
    #[instrument(skip(self))]
    pub async fn replay(&self, event_type: &str) -> Result<ReplayReport> {
        let events = self.store.by_type(event_type).await?;
        let handlers = self.handlers.matching(event_type);
        let mut report = ReplayReport::new(event_type);

        for event in &events {
            for handler in &handlers {
                if let Err(reason) = self.invoke(handler.as_ref(), event).await {
                    warn!(
                        event_id = event.id(),
                        handler = handler.handler_name(),
                        reason = %reason,
                        "handler failed during replay"
                    );
                    report.failures.push(ReplayFailure {
                        event_id: event.id().to_string(),
                        handler: handler.handler_name().to_string(),
                        reason,
                    });
                }
            }
            report.replayed += 1;
        }

        self.metrics.record_replayed(report.replayed as u64);
        info!(
            replayed = report.replayed,
            failures = report.failures.len(),
            "replay finished"
        );
        Ok(report)
    }

    // ---- 查询 ----

    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Option<Event>> {
        self.store.get(event_id).await
    }

    pub async fn dead_letters(&self) -> Vec<Event> {
        self.dead_letters.list().await
    }

    pub async fn dead_letter(&self, event_id: &str) -> Option<Event> {
        self.dead_letters.get(event_id).await
    }

    // ---- 生命周期 ----

    /// 关闭总线：拒绝后续发布，并唤醒处于退避等待中的投递使其放弃重试
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("event bus shutting down");
        }
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
