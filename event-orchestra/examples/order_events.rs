/// 事件总线（内存版）示例
/// 展示 订阅 → 过滤 → 发布 → 重试 → 死信 → 重放 的完整流程，以及关联 ID 在派生事件间的传递
///
/// 运行：RUST_LOG=event_orchestra=debug cargo run --example order_events
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use event_orchestra::{Event, EventBus, EventBusConfig, EventHandler, RetryPolicy};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ============================================================================
// 示例处理器
// ============================================================================

/// 库存服务：每三次调用中前两次模拟超时
#[derive(Default)]
struct FlakyInventory {
    calls: AtomicUsize,
}

#[async_trait]
impl EventHandler for FlakyInventory {
    fn handler_name(&self) -> &str {
        "inventory"
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n % 3 < 2 {
            anyhow::bail!("inventory service timed out");
        }
        println!(
            "inventory reserved: order={} correlation={}",
            event.payload()["order_id"],
            event.correlation_id()
        );
        Ok(())
    }
}

/// 支付网关：拒绝所有金额超过 1000 的订单
struct PaymentGateway;

#[async_trait]
impl EventHandler for PaymentGateway {
    fn handler_name(&self) -> &str {
        "payment"
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        let amount = event.payload()["amount"].as_i64().unwrap_or_default();
        if amount > 1000 {
            anyhow::bail!("payment declined for amount {amount}");
        }
        println!("payment captured: amount={amount}");
        Ok(())
    }
}

fn order(order_id: &str, amount: i64, max_retries: u32) -> Event {
    Event::builder()
        .event_type("order.created")
        .payload(json!({ "order_id": order_id, "amount": amount }))
        .max_retries(max_retries)
        .build()
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bus = Arc::new(
        EventBus::builder()
            .config(
                EventBusConfig::builder()
                    .retry(
                        RetryPolicy::builder()
                            .base_delay(Duration::from_millis(50))
                            .max_delay(Duration::from_millis(500))
                            .build(),
                    )
                    .handler_timeout(Duration::from_secs(2))
                    .build(),
            )
            .build(),
    );

    bus.subscribe("order.created", Arc::new(FlakyInventory::default()));
    bus.subscribe("order.created", Arc::new(PaymentGateway));
    bus.add_filter("order.created", |e: &Event| {
        e.payload()["amount"].as_i64().unwrap_or_default() > 0
    });

    // 派生事件沿用上游的关联 ID
    bus.subscribe_fn("order.completed", "notifier", |ev: Event| async move {
        println!(
            "notify customer: order={} correlation={} caused_by={:?}",
            ev.payload()["order_id"],
            ev.correlation_id(),
            ev.causation_id()
        );
        anyhow::Ok(())
    });

    // 1) 两次失败后成功
    let ok = bus.publish(order("o-1", 120, 2)).await?;
    println!("o-1 => status={} retries={}", ok.status(), ok.retry_count());
    bus.publish(Event::caused_by(&ok, "order.completed", json!({"order_id": "o-1"})))
        .await?;

    // 2) 被过滤：金额为 0
    let skipped = bus.publish(order("o-2", 0, 2)).await?;
    println!("o-2 => status={} (filtered)", skipped.status());

    // 3) 支付始终失败，且不允许重试 → 死信
    let dead = bus.publish(order("o-3", 5000, 0)).await?;
    println!(
        "o-3 => status={} last_error={:?}",
        dead.status(),
        dead.last_error()
    );

    // 4) 并发发布（发后即忘）
    let tasks: Vec<_> = (0..3)
        .map(|i| {
            let bus = bus.clone();
            tokio::spawn(async move { bus.publish(order(&format!("o-bg-{i}"), 10, 3)).await })
        })
        .collect();
    for t in tasks {
        t.await??;
    }

    // 5) 重放全部订单事件（不会修改其状态）
    let report = bus.replay("order.created").await?;
    println!(
        "replayed={} failed_events={:?}",
        report.replayed,
        report.failed_event_ids()
    );

    for ev in bus.dead_letters().await {
        println!("dead letter: id={} error={:?}", ev.id(), ev.last_error());
    }
    println!(
        "metrics: {}",
        serde_json::to_string_pretty(&bus.get_metrics())?
    );

    bus.shutdown();
    Ok(())
}
