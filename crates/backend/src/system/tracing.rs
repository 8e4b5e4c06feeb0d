use anyhow::Context;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

pub const LOG_FILE_NAME: &str = "unarchiver.log";

/// Инициализация системы трассировки (tracing)
///
/// Логи пишутся в:
/// - logs/unarchiver.log рядом с exe (без цветов, уровень из RUST_LOG)
/// - stderr (только предупреждения и ошибки, чтобы не мешать журналу запуска)
pub fn initialize() -> anyhow::Result<std::path::PathBuf> {
    let log_dir = std::env::current_exe()
        .ok()
        .and_then(|exe_path| exe_path.parent().map(|dir| dir.join("logs")))
        .unwrap_or_else(|| std::path::Path::new("target").join("logs"));

    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Cannot create log directory {}", log_dir.display()))?;

    let log_file_path = log_dir.join(LOG_FILE_NAME);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("Cannot open log file {}", log_file_path.display()))?;

    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,reqwest=warn,hyper=warn".into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(LevelFilter::WARN),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Cannot initialize tracing subscriber: {}", e))?;

    tracing::info!("Logging to {}", log_file_path.display());
    Ok(log_file_path)
}
