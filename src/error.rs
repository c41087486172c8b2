use std::path::PathBuf;
use std::time::Duration;

/// Every way a migration run can fail.
///
/// The first error aborts the run; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Invalid configuration: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Timed out after {}s connecting to the database", .0.as_secs())]
    ConnectTimeout(Duration),
    #[error("{step} failed: {source}")]
    Database {
        step: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("Failed to read {}: {source}", path.display())]
    ReadSql {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} contains no SQL", path.display())]
    EmptySql { path: PathBuf },
    #[error("Table {0} has no columns in information_schema after the migration")]
    TableNotCreated(String),
}

impl MigrationError {
    pub fn database(step: &'static str, source: sqlx::Error) -> Self {
        MigrationError::Database { step, source }
    }
}

pub type Result<T, E = MigrationError> = std::result::Result<T, E>;
