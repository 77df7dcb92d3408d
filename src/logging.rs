use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "vocab-bot.log";

/// Keeps the non-blocking file writer flushing. Hold it until exit.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Stdout logging, plus a daily-rotated file when `log_dir` is given.
/// Falls back to stdout only if the directory cannot be created.
pub fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> Option<FileLogGuard> {
    let stdout_layer = fmt::layer().with_target(true);

    if let Some(log_dir) = log_dir {
        match std::fs::create_dir_all(log_dir) {
            Ok(()) => {
                let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true);

                tracing_subscriber::registry()
                    .with(env_filter(log_level))
                    .with(stdout_layer)
                    .with(file_layer)
                    .init();

                return Some(FileLogGuard { _guard: guard });
            }
            Err(err) => {
                eprintln!("failed to create log directory {}: {err}", log_dir.display());
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(stdout_layer)
        .init();

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directive_falls_back_to_info() {
        let filter = env_filter("vocab_bot_rust=loud");
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn module_directives_are_kept() {
        let filter = env_filter("vocab_bot_rust=debug,tower_http=warn");
        let rendered = filter.to_string();
        assert!(rendered.contains("vocab_bot_rust=debug"));
        assert!(rendered.contains("tower_http=warn"));
    }
}
