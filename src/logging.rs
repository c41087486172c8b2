use anyhow::Context;

/// Install the global tracing subscriber.
///
/// Diagnostics go to stderr so stdout carries only progress messages.
pub fn init() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "gatherly_migrate=info".into()),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}
