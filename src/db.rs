use crate::config::DatabaseSettings;
use crate::error::{MigrationError, Result};
use futures::future::BoxFuture;
use sqlx::postgres::PgQueryResult;
use sqlx::{Connection, PgConnection};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Open a single connection, giving up after the configured connect timeout.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgConnection> {
    let options = settings.connect_options()?;
    let timeout = settings.connect_timeout();

    info!("🔗 Connecting to database: {}", settings.redacted_url());

    match tokio::time::timeout(timeout, PgConnection::connect_with(&options)).await {
        Ok(connection) => connection.map_err(|e| MigrationError::database("Connect", e)),
        Err(_) => Err(MigrationError::ConnectTimeout(timeout)),
    }
}

/// Cheap round trip to confirm the session is usable.
pub async fn ping(conn: &mut PgConnection) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(&mut *conn)
        .await
        .map_err(|e| MigrationError::database("Health check", e))?;
    Ok(())
}

/// Run `f` against a fresh connection and close the connection afterwards on
/// every path.
///
/// An error from `f` takes precedence over an error while closing.
pub async fn with_connection<F, R>(settings: &DatabaseSettings, f: F) -> Result<R>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<R>>,
{
    let mut conn = connect(settings).await?;

    let result = match ping(&mut conn).await {
        Ok(()) => f(&mut conn).await,
        Err(e) => Err(e),
    };

    let closed = conn.close().await;
    debug!("Database connection closed");

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(MigrationError::database("Close connection", e)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("Failed to close database connection cleanly: {}", close_err);
            Err(e)
        }
    }
}

/// Execute one statement, logging how long it took.
pub async fn execute_timed(
    conn: &mut PgConnection,
    step: &'static str,
    sql: &str,
    slow_threshold: Duration,
) -> Result<PgQueryResult> {
    let started = Instant::now();
    let result = sqlx::query(sql)
        .execute(&mut *conn)
        .await
        .map_err(|e| MigrationError::database(step, e))?;
    log_duration(step, started.elapsed(), slow_threshold);
    Ok(result)
}

pub(crate) fn log_duration(step: &str, elapsed: Duration, slow_threshold: Duration) {
    if elapsed > slow_threshold {
        warn!(
            "Slow statement detected: {} took {}ms",
            step,
            elapsed.as_millis()
        );
    } else {
        debug!("{} took {}ms", step, elapsed.as_millis());
    }
}
