use anyhow::Result;
use tracing_appender::non_blocking;
use tracing_subscriber::EnvFilter;

/// Initialize logging: compact console output filtered by `RUST_LOG`
/// (default `info`), mirrored to a file when `DCADASH_LOG_FILE` is set.
pub fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var("DCADASH_LOG_FILE") {
        Ok(path) => {
            let log_file = std::fs::File::create(&path)
                .map_err(|e| anyhow::anyhow!("Failed to create log file {path}: {e}"))?;

            let (file_writer, _file_guard) = non_blocking(log_file);

            // Store the guard to prevent it from being dropped
            std::mem::forget(_file_guard);

            use tracing_subscriber::fmt::writer::MakeWriterExt;
            let multi_writer = std::io::stderr.and(file_writer);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(multi_writer)
                .with_ansi(true)
                .with_target(false)
                .compact()
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .init();
        }
    }

    Ok(())
}
