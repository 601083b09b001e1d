use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument, warn};

use crate::application::ports::HistoryStoreError;
use crate::presentation::config::DatabaseSettings;

/// Opens the history store pool, retrying the initial connection within the
/// configured budget so the controller can start alongside its database.
#[instrument(skip(settings), fields(max_connections = settings.max_connections))]
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, HistoryStoreError> {
    let url = settings.url.as_deref().ok_or_else(|| {
        HistoryStoreError::ConnectionFailed("database.url is not configured".to_string())
    })?;
    let options = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs.max(1)));

    let mut backoff = Duration::from_millis(settings.connect_backoff_ms);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match options.clone().connect(url).await {
            Ok(pool) => {
                info!(attempt, "History store pool established");
                return Ok(pool);
            }
            Err(e) if attempt <= settings.connect_retries => {
                warn!(
                    error = %e,
                    attempt,
                    retries = settings.connect_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "History store unreachable, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
            Err(e) => return Err(HistoryStoreError::ConnectionFailed(e.to_string())),
        }
    }
}
