use gatherly_migrate::config::Settings;
use gatherly_migrate::migrations::events_data;
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
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let slow_threshold = settings.database.slow_statement_threshold();

    db::with_connection(&settings.database, move |conn| {
        Box::pin(async move {
            let mut progress = ConsoleProgress;
            progress.report(ProgressEvent::Connected);
            events_data::run(conn, slow_threshold, &mut progress).await
        })
    })
    .await?;

    Ok(())
}
