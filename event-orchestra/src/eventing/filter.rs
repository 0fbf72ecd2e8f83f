//! 事件过滤器（EventFilter）
//!
//! 按事件类型注册的无副作用谓词，在投递前依注册顺序求值：
//! - 全部返回 `true` 才会投递；
//! - 首个 `false` 即短路；
//! - 返回 `Err` 或 panic 一律视为 `false`（失败即关闭）。
//!
use crate::event::Event;
use crate::eventing::handler::panic_message;
use dashmap::DashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::warn;

/// 事件过滤器：判断事件是否允许投递
pub trait EventFilter: Send + Sync {
    fn filter_name(&self) -> &str {
        "anonymous"
    }

    fn allows(&self, event: &Event) -> anyhow::Result<bool>;
}

/// 将 `Fn(&Event) -> bool` 适配为 `EventFilter`
pub struct PredicateFilter<F> {
    predicate: F,
}

impl<F> PredicateFilter<F>
where
    F: Fn(&Event) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> EventFilter for PredicateFilter<F>
where
    F: Fn(&Event) -> bool + Send + Sync,
{
    fn allows(&self, event: &Event) -> anyhow::Result<bool> {
        Ok((self.predicate)(event))
    }
}

/// 单一事件类型的过滤链
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn EventFilter>>,
}

impl FilterChain {
    pub fn push(&mut self, filter: Arc<dyn EventFilter>) {
        self.filters.push(filter);
    }

    pub fn evaluate(&self, event: &Event) -> bool {
        self.filters.iter().all(|f| Self::evaluate_one(f.as_ref(), event))
    }

    fn evaluate_one(filter: &dyn EventFilter, event: &Event) -> bool {
        match catch_unwind(AssertUnwindSafe(|| filter.allows(event))) {
            Ok(Ok(allowed)) => allowed,
            Ok(Err(err)) => {
                warn!(
                    filter = filter.filter_name(),
                    event_id = event.id(),
                    error = %err,
                    "filter failed, vetoing delivery"
                );
                false
            }
            Err(payload) => {
                warn!(
                    filter = filter.filter_name(),
                    event_id = event.id(),
                    panic = %panic_message(payload.as_ref()),
                    "filter panicked, vetoing delivery"
                );
                false
            }
        }
    }
}

/// 过滤表：事件类型 → 过滤链
#[derive(Default)]
pub(crate) struct FilterRegistry {
    by_type: DashMap<String, FilterChain>,
}

impl FilterRegistry {
    pub(crate) fn register(&self, event_type: String, filter: Arc<dyn EventFilter>) {
        self.by_type.entry(event_type).or_default().push(filter);
    }

    /// 无过滤器的类型直接放行。过滤链先复制出来再求值，过滤器内部可以安全地访问总线。
    pub(crate) fn allows(&self, event: &Event) -> bool {
        let chain = match self.by_type.get(event.event_type()) {
            Some(chain) => chain.value().clone(),
            None => return true,
        };
        chain.evaluate(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing;

    impl EventFilter for Failing {
        fn filter_name(&self) -> &str {
            "failing"
        }
        fn allows(&self, _event: &Event) -> anyhow::Result<bool> {
            anyhow::bail!("lookup unavailable")
        }
    }

    fn ev(amount: i64) -> Event {
        Event::new("order.created", json!({ "amount": amount }))
    }

    #[test]
    fn all_filters_must_pass() {
        let mut chain = FilterChain::default();
        chain.push(Arc::new(PredicateFilter::new(|e: &Event| {
            e.payload()["amount"].as_i64().unwrap_or(0) > 0
        })));
        chain.push(Arc::new(PredicateFilter::new(|e: &Event| {
            e.payload()["amount"].as_i64().unwrap_or(0) < 100
        })));

        assert!(chain.evaluate(&ev(50)));
        assert!(!chain.evaluate(&ev(0)));
        assert!(!chain.evaluate(&ev(500)));
    }

    #[test]
    fn short_circuits_on_first_veto() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut chain = FilterChain::default();
        chain.push(Arc::new(PredicateFilter::new(|_: &Event| false)));
        chain.push(Arc::new(PredicateFilter::new(move |_: &Event| {
            counter.fetch_add(1, Ordering::Relaxed);
            true
        })));

        assert!(!chain.evaluate(&ev(1)));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn errors_and_panics_fail_closed() {
        let mut chain = FilterChain::default();
        chain.push(Arc::new(Failing));
        assert!(!chain.evaluate(&ev(1)));

        let mut chain = FilterChain::default();
        chain.push(Arc::new(PredicateFilter::new(|_: &Event| -> bool {
            panic!("bad predicate")
        })));
        assert!(!chain.evaluate(&ev(1)));
    }

    #[test]
    fn registry_is_per_type() {
        let reg = FilterRegistry::default();
        reg.register(
            "order.created".into(),
            Arc::new(PredicateFilter::new(|_: &Event| false)),
        );

        assert!(!reg.allows(&ev(1)));
        assert!(reg.allows(&Event::new("order.shipped", json!({}))));
    }
}
