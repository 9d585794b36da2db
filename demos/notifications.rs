use std::sync::Arc;
use std::time::Duration;
use tokio_dispatch::prelude::*;
use tracing::Dispatch;

#[derive(Debug, Clone)]
struct Notification {
    channel: &'static str,
    recipient: String,
}

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .finish();
    let dispatcher = Dispatcher::builder(Dispatch::new(subscriber)).build();

    println!("Registering handlers...\n");

    for channel in ["email", "sms", "push"] {
        dispatcher.on_handler(
            "notification.sent",
            handle_payload(move |_ctx, n: Notification| async move {
                if n.channel == channel {
                    println!("📨 [{}] delivered to {}", channel, n.recipient);
                }
            }),
        );
    }

    dispatcher.on("*.sent", |_ctx, event: Arc<Event>| async move {
        println!("🔎 audit: {} ({})", event.signature(), event.id());
    });

    dispatcher.on("task.*", |ctx: CancellationToken, event: Arc<Event>| async move {
        tokio::select! {
            _ = ctx.cancelled() => println!("Task cancelled: {}", event.signature()),
            _ = tokio::time::sleep(Duration::from_millis(100)) => {
                println!("Task completed: {}", event.signature())
            }
        }
    });

    dispatcher.on("task.flaky", |_ctx, _event| async {
        panic!("flaky task exploded");
    });

    let ctx = CancellationToken::new();

    println!("start");
    dispatcher
        .emit_sync(
            &ctx,
            "notification.sent",
            Value::new(Notification {
                channel: "sms",
                recipient: "+15550100".into(),
            }),
        )
        .await;
    println!("all complete\n");

    let short = CancellationToken::new();
    let canceller = short.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });
    dispatcher.emit_sync(&short, "task.long", Value::nil()).await;

    dispatcher.emit_sync(&ctx, "task.flaky", Value::nil()).await;

    dispatcher.emit(&ctx, "notification.sent", Value::new("not a notification"));
    tokio::time::sleep(Duration::from_millis(20)).await;

    println!("\n{}", dispatcher.stats());
}
