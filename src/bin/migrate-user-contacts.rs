use gatherly_migrate::config::Settings;
use gatherly_migrate::migrations::{self, user_contacts};
use gatherly_migrate::progress::{ConsoleProgress, Progress, ProgressEvent};
use gatherly_migrate::{db, logging};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    if let Err(e) = logging::init() {
        eprintln!("⚠️  {:#}", e);
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Migration failed: {}", e);
            eprintln!("Error details: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let slow_threshold = settings.database.slow_statement_threshold();

    // Read before connecting so a missing file never opens a session
    let migration = user_contacts::load(&settings.migrations_dir)?;

    db::with_connection(&settings.database, move |conn| {
        Box::pin(async move {
            let mut progress = ConsoleProgress;
            progress.report(ProgressEvent::Connected);
            migrations::apply_sql(conn, &migration, slow_threshold, &mut progress).await
        })
    })
    .await?;

    Ok(())
}
