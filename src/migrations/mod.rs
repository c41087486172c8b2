//! One module per one-shot migration.
//!
//! Migrations run their statements in order on a single connection and stop
//! at the first error. Nothing is recorded about which migrations ran; the SQL
//! itself is expected to tolerate being applied twice.

pub mod events_data;
pub mod user_contacts;

use sqlx::PgConnection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::database::models::{BatchOutcome, ColumnInfo};
use crate::database::queries;
use crate::error::{MigrationError, Result};
use crate::progress::{Progress, ProgressEvent};

/// A migration whose statements live in a SQL file.
///
/// The file is opaque: it is never parsed, only sent to the server as one batch.
#[derive(Debug, Clone)]
pub struct SqlMigration {
    pub name: String,
    /// Table the file is expected to create, checked after the batch runs.
    pub table: String,
    pub path: PathBuf,
    pub sql: String,
}

impl SqlMigration {
    pub fn load(path: impl AsRef<Path>, name: &str, table: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let sql = std::fs::read_to_string(&path).map_err(|source| MigrationError::ReadSql {
            path: path.clone(),
            source,
        })?;

        if sql.trim().is_empty() {
            return Err(MigrationError::EmptySql { path });
        }

        Ok(SqlMigration {
            name: name.to_string(),
            table: table.to_string(),
            path,
            sql,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub path: PathBuf,
    pub outcome: BatchOutcome,
    pub columns: Vec<ColumnInfo>,
}

/// Execute a SQL file migration and read back the shape of the table it creates.
pub async fn apply_sql(
    conn: &mut PgConnection,
    migration: &SqlMigration,
    slow_threshold: Duration,
    progress: &mut dyn Progress,
) -> Result<BatchReport> {
    info!("Applying {}", migration.path.display());
    progress.report(ProgressEvent::BatchStarted {
        name: migration.name.clone(),
    });

    let outcome = queries::execute_batch(conn, &migration.sql, slow_threshold).await?;

    progress.report(ProgressEvent::BatchCompleted {
        name: migration.name.clone(),
    });

    let columns = queries::fetch_table_columns(conn, &migration.table).await?;
    if columns.is_empty() {
        return Err(MigrationError::TableNotCreated(migration.table.clone()));
    }

    progress.report(ProgressEvent::TableColumns {
        columns: columns.clone(),
    });

    Ok(BatchReport {
        path: migration.path.clone(),
        outcome,
        columns,
    })
}
