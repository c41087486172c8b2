use futures::TryStreamExt;
use sqlx::postgres::PgQueryResult;
use sqlx::{Executor, PgConnection};
use std::time::{Duration, Instant};
use tracing::info;

use super::models::*;
use crate::db::{execute_timed, log_duration};
use crate::error::{MigrationError, Result};

const ADD_EVENTS_DATA_COLUMN: &str =
    "ALTER TABLE events ADD COLUMN IF NOT EXISTS data JSONB DEFAULT '{}'::jsonb";

const BACKFILL_EVENTS_DATA: &str = "UPDATE events SET data = '{}'::jsonb WHERE data IS NULL";

// information_schema uses domain types, so everything is cast to plain types
const SELECT_COLUMNS: &str = "SELECT column_name::text AS column_name,
        data_type::text AS data_type,
        (is_nullable = 'YES') AS is_nullable,
        column_default::text AS column_default,
        ordinal_position::int4 AS ordinal_position
     FROM information_schema.columns
     WHERE table_schema = current_schema() AND table_name = $1";

// events.data queries
pub async fn add_events_data_column(
    conn: &mut PgConnection,
    slow_threshold: Duration,
) -> Result<()> {
    execute_timed(
        conn,
        "Add events.data column",
        ADD_EVENTS_DATA_COLUMN,
        slow_threshold,
    )
    .await?;
    Ok(())
}

/// Returns the number of rows that held NULL.
pub async fn backfill_events_data(
    conn: &mut PgConnection,
    slow_threshold: Duration,
) -> Result<u64> {
    let result = execute_timed(
        conn,
        "Backfill events.data",
        BACKFILL_EVENTS_DATA,
        slow_threshold,
    )
    .await?;
    Ok(result.rows_affected())
}

/// Send `sql` as one simple-protocol batch so it may hold many statements.
pub async fn execute_batch(
    conn: &mut PgConnection,
    sql: &str,
    slow_threshold: Duration,
) -> Result<BatchOutcome> {
    let started = Instant::now();

    let results: Vec<PgQueryResult> = (&mut *conn)
        .execute_many(sql)
        .try_collect()
        .await
        .map_err(|e| MigrationError::database("Execute SQL batch", e))?;

    log_duration("Execute SQL batch", started.elapsed(), slow_threshold);

    let outcome = BatchOutcome {
        statements: results.len(),
        rows_affected: results.iter().map(PgQueryResult::rows_affected).sum(),
    };
    info!(
        "Batch applied: {} statements, {} rows affected",
        outcome.statements, outcome.rows_affected
    );

    Ok(outcome)
}

// Catalog queries
pub async fn fetch_table_columns(conn: &mut PgConnection, table: &str) -> Result<Vec<ColumnInfo>> {
    let query = format!("{} ORDER BY ordinal_position", SELECT_COLUMNS);

    sqlx::query_as::<_, ColumnInfo>(&query)
        .bind(table)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| MigrationError::database("Read column catalog", e))
}

pub async fn fetch_column(
    conn: &mut PgConnection,
    table: &str,
    column: &str,
) -> Result<Option<ColumnInfo>> {
    let query = format!("{} AND column_name = $2", SELECT_COLUMNS);

    sqlx::query_as::<_, ColumnInfo>(&query)
        .bind(table)
        .bind(column)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| MigrationError::database("Read column catalog", e))
}
