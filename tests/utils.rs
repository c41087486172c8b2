#![allow(dead_code)]

use gatherly_migrate::config::Settings;
use gatherly_migrate::db;
use gatherly_migrate::progress::{Progress, ProgressEvent};
use sqlx::{Connection, PgConnection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Keeps every reported event so tests can assert on the sequence.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for RecordingProgress {
    fn report(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

pub fn unique_name(prefix: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!(
        "{}_{}_{}_{}",
        prefix,
        std::process::id(),
        nanos,
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

pub fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Settings pointing at `TEST_DATABASE_URL`.
pub fn test_settings(application_name: Option<&str>) -> Settings {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let ssl_mode = std::env::var("TEST_DATABASE_SSL_MODE").unwrap_or_else(|_| "prefer".into());

    let mut pairs = vec![
        ("DATABASE_URL".to_string(), url),
        ("DATABASE_SSL_MODE".to_string(), ssl_mode),
    ];
    if let Some(name) = application_name {
        pairs.push(("DATABASE_APPLICATION_NAME".to_string(), name.to_string()));
    }

    Settings::from_vars(pairs).expect("Failed to build test settings")
}

/// A throwaway schema that the connection's search_path points at.
pub struct ScratchSchema {
    pub name: String,
    pub conn: PgConnection,
}

impl ScratchSchema {
    pub async fn create() -> Self {
        let settings = test_settings(None);
        let mut conn = db::connect(&settings.database)
            .await
            .expect("Failed to connect to test database");

        let name = unique_name("gm_test");
        sqlx::query(&format!("CREATE SCHEMA {}", name))
            .execute(&mut conn)
            .await
            .expect("Failed to create scratch schema");
        sqlx::query(&format!("SET search_path TO {}", name))
            .execute(&mut conn)
            .await
            .expect("Failed to set search_path");

        Self { name, conn }
    }

    pub async fn execute(&mut self, sql: &str) {
        sqlx::query(sql)
            .execute(&mut self.conn)
            .await
            .expect("Failed to run setup statement");
    }

    pub async fn count(&mut self, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&mut self.conn)
            .await
            .expect("Failed to run count query")
    }

    pub async fn cleanup(mut self) {
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.name))
            .execute(&mut self.conn)
            .await
            .ok();
        self.conn.close().await.ok();
    }
}
