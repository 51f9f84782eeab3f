use crate::config::LoggingConfig;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// HTTP stack crates that are chatty at debug level
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

/// Filter directive for `config`: the configured level for this crate,
/// capped at `warn` for the HTTP stack unless the level is `trace`.
pub fn filter_directive(config: &LoggingConfig) -> String {
    if config.log_level.eq_ignore_ascii_case("trace") {
        return config.log_level.clone();
    }
    let mut directive = config.log_level.clone();
    for target in QUIET_TARGETS {
        directive.push_str(&format!(",{}=warn", target));
    }
    directive
}

/// Rolling file writer for the audit log. Buffered lines are flushed when
/// the guard drops.
pub fn file_writer(config: &LoggingConfig) -> (NonBlocking, WorkerGuard) {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };
    tracing_appender::non_blocking(file_appender)
}

/// Install the global subscriber. Keep the returned guard alive until the
/// process is about to exit, and let it drop normally: `process::exit`
/// skips the flush.
pub fn init_logging(config: &LoggingConfig) -> WorkerGuard {
    let (non_blocking, guard) = file_writer(config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_level: &str, log_dir: &str) -> LoggingConfig {
        LoggingConfig {
            log_level: log_level.to_string(),
            log_dir: log_dir.to_string(),
            log_file: "agcod-test.log".to_string(),
            use_json: false,
            rotation: "never".to_string(),
        }
    }

    #[test]
    fn test_filter_quiets_http_stack() {
        let directive = filter_directive(&config("debug", "."));
        assert!(directive.starts_with("debug,"));
        assert!(directive.contains("hyper=warn"));
        assert!(directive.contains("reqwest=warn"));
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_trace_level_keeps_everything() {
        assert_eq!(filter_directive(&config("trace", ".")), "trace");
    }

    #[test]
    fn test_dropping_guard_flushes_file() {
        let dir = std::env::temp_dir().join(format!("agcod-log-{}", std::process::id()));
        let cfg = config("info", dir.to_str().unwrap());
        let (writer, guard) = file_writer(&cfg);

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(request_id = "order-1", "Issuance failed");
        });
        drop(guard);

        let contents = std::fs::read_to_string(dir.join("agcod-test.log")).unwrap();
        assert!(contents.contains("Issuance failed"));
        assert!(contents.contains("order-1"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
