use std::sync::Arc;

use availability_alerts::{http, telemetry, Alerts, Config, Dispatcher, InMemorySubscriptionStore, LogSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    telemetry::init(&config)?;

    let store = Arc::new(InMemorySubscriptionStore::new());
    let (dispatcher, dispatcher_handle) = Dispatcher::spawn(LogSink::new());
    let alerts = Arc::new(Alerts::new(store, dispatcher).with_timestamp_policy(config.timestamp_policy));

    http::serve_with_shutdown(alerts, config.bind_addr, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    let stats = dispatcher_handle.stop();
    tracing::info!(
        delivered = stats.delivered,
        failed = stats.failed,
        "notification dispatcher stopped"
    );
    Ok(())
}
