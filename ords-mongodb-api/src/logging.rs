use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

const DEFAULT_DIRECTIVE: &str = "ords_mongodb_api=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` selects one JSON object per line, anything else is human readable
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_filter() -> EnvFilter {
    // Read from `RUST_LOG` environment variable, with fallback to default
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder().with_default_directive(Level::WARN.into()).parse_lossy(DEFAULT_DIRECTIVE)
    })
}

/// Installs the global subscriber, a second call leaves the first one in place
pub fn init_logging() {
    let log_format = std::env::var("LOG_FORMAT").ok();

    let result = match LogFormat::from_env_value(log_format.as_deref()) {
        LogFormat::Json => {
            let fmt_layer = fmt::layer().json().with_target(true).with_file(true).with_line_number(true);
            Registry::default().with(env_filter()).with(fmt_layer).try_init()
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().with_target(true).with_thread_ids(false);
            Registry::default().with(env_filter()).with(fmt_layer).try_init()
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Global subscriber already installed");
    }
}
