//! BetaWatch broadcast monitor binary entrypoint.
//!
//! Seeds the registry from the configured beta-code list and announces
//! every newly-available beta to one fixed chat.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use betawatch_common::config::AppConfig;
use betawatch_engine::cycle::{CycleDriver, DispatchMode};
use betawatch_engine::registry::MonitorRegistry;
use betawatch_monitor::client::TestFlightClient;
use betawatch_monitor::scheduler::Scheduler;
use betawatch_notifier::TelegramNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "betawatch_monitor=info,betawatch_engine=info".into()),
        )
        .init();

    tracing::info!("BetaWatch monitor starting...");

    // Load configuration
    let config = AppConfig::from_env()?;
    let chat_id = config
        .broadcast_chat_id
        .ok_or_else(|| anyhow::anyhow!("BROADCAST_CHAT_ID environment variable is required"))?;
    if config.beta_codes.is_empty() {
        anyhow::bail!("BETA_CODES must list at least one beta code");
    }

    let registry = MonitorRegistry::seed(config.beta_codes.iter().cloned());
    tracing::info!(codes = registry.len(), chat_id, "Monitoring configured beta codes");

    let client = TestFlightClient::new(
        config.testflight_url.clone(),
        Duration::from_secs(config.fetch_timeout_secs),
    )?;
    let notifier = TelegramNotifier::new(config.telegram_bot_token.clone());
    let driver = CycleDriver::new(
        client,
        notifier,
        DispatchMode::Broadcast(chat_id),
        config.testflight_url.clone(),
    );

    let scheduler = Scheduler::new(
        driver,
        Arc::new(Mutex::new(registry)),
        Duration::from_millis(config.check_interval_ms),
        Duration::from_millis(config.startup_delay_ms),
    );

    tracing::info!(
        interval_ms = config.check_interval_ms,
        startup_delay_ms = config.startup_delay_ms,
        "Scheduler configured"
    );

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("BetaWatch monitor stopped.");
    Ok(())
}
