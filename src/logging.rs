use crate::errors::Result;
use crate::shared::constants::LOG_DIR;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,aws_config=warn,aws_smithy_runtime=warn";

/// Log to stderr and a daily rolling file under `LOG_DIR`.
///
/// Stdout is left to command output such as `list-backups --json`.
/// Keep the returned guard alive until exit so the file writer flushes.
pub fn init_logging(file_name: &str) -> Result<WorkerGuard> {
    use tracing_appender::rolling;
    use tracing_subscriber::fmt::writer::MakeWriterExt;
    use tracing_subscriber::util::SubscriberInitExt;

    std::fs::create_dir_all(LOG_DIR)?;
    let file_appender = rolling::daily(LOG_DIR, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    build_subscriber(std::io::stderr.and(non_blocking), env_filter).init();
    Ok(guard)
}

fn build_subscriber<W>(writer: W, filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_ansi(false)
        .finish()
}
