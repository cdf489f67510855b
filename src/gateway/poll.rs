use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use super::server::{AppState, process_update};
use crate::channel::telegram::TelegramClient;
use crate::config::RetortConfig;
use crate::error::SendError;

const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Run the relay by long-polling `getUpdates` instead of receiving webhooks.
///
/// Any registered webhook is removed first; the platform refuses to serve
/// `getUpdates` while one is set.
pub async fn run(config: RetortConfig) -> anyhow::Result<()> {
    let (state, client) = AppState::from_config(&config)?;
    let state = Arc::new(state);

    if let Err(e) = client.delete_webhook().await {
        warn!("could not remove webhook before polling: {e}");
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("could not listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };
    poll_until(&state, &client, config.telegram.poll_timeout_secs, shutdown).await;
    Ok(())
}

/// Poll until `shutdown` resolves. Shutdown is honoured both mid-request and
/// during the retry backoff.
pub async fn poll_until<F: Future>(
    state: &AppState,
    client: &TelegramClient,
    timeout_secs: u64,
    shutdown: F,
) {
    tokio::pin!(shutdown);

    info!(timeout_secs, "polling for updates");
    let mut offset = 0;
    loop {
        let result = tokio::select! {
            _ = &mut shutdown => break,
            result = poll_once(state, client, offset, timeout_secs) => result,
        };

        match result {
            Ok(next) => offset = next,
            Err(e) => {
                warn!("getUpdates failed: {e}");
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = sleep(RETRY_DELAY) => {}
                }
            }
        }
    }
    info!("stopping poller");
}

/// Fetch one batch, process it in order, and return the next offset.
pub async fn poll_once(
    state: &AppState,
    client: &TelegramClient,
    offset: i64,
    timeout_secs: u64,
) -> Result<i64, SendError> {
    let updates = client.get_updates(offset, timeout_secs).await?;
    let mut next = offset;
    for update in updates {
        next = next.max(update.update_id + 1);
        process_update(state, update).await;
    }
    Ok(next)
}
