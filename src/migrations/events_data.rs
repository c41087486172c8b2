//! Adds the free-form `data` JSONB column to `events` and fills in NULLs.

use sqlx::PgConnection;
use std::time::Duration;
use tracing::{info, warn};

use crate::database::models::ColumnInfo;
use crate::database::queries;
use crate::error::Result;
use crate::progress::{Progress, ProgressEvent};

pub const TABLE: &str = "events";
pub const COLUMN: &str = "data";

#[derive(Debug, Clone)]
pub struct BackfillReport {
    pub rows_backfilled: u64,
    /// Catalog entry for `events.data` after the run.
    pub column: Option<ColumnInfo>,
}

pub async fn run(
    conn: &mut PgConnection,
    slow_threshold: Duration,
    progress: &mut dyn Progress,
) -> Result<BackfillReport> {
    queries::add_events_data_column(conn, slow_threshold).await?;
    progress.report(ProgressEvent::ColumnAdded {
        column: COLUMN.to_string(),
    });

    let rows_backfilled = queries::backfill_events_data(conn, slow_threshold).await?;
    info!("Backfilled {}.{} on {} rows", TABLE, COLUMN, rows_backfilled);
    progress.report(ProgressEvent::RowsBackfilled {
        table: TABLE.to_string(),
        rows: rows_backfilled,
    });

    let column = queries::fetch_column(conn, TABLE, COLUMN).await?;
    match &column {
        Some(column) => progress.report(ProgressEvent::ColumnVerified {
            table: TABLE.to_string(),
            column: column.clone(),
        }),
        // events lives outside the current schema; the ALTER still succeeded
        None => warn!("{}.{} not visible in the current schema", TABLE, COLUMN),
    }

    progress.report(ProgressEvent::Completed);

    Ok(BackfillReport {
        rows_backfilled,
        column,
    })
}
