pub use tracing;

use const_format::concatcp;

pub const LOG_ENV: &str = concatcp!(crate::ENV_PREFIX, "_LOG");

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => ($crate::logging::tracing::error!($($arg)+))
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)+) => ($crate::logging::tracing::trace!($($arg)+))
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => ($crate::logging::tracing::info!($($arg)+))
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => ($crate::logging::tracing::debug!($($arg)+))
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => ($crate::logging::tracing::warn!($($arg)+))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    #[default]
    Flat,
    /// Indents events by their enclosing spans, which makes nested queries
    /// easier to follow.
    Tree,
}

/// Installs the global subscriber, filtered by [`LOG_ENV`].
///
/// Calling it more than once is harmless; only the first call takes effect.
pub fn init_logging(style: LogStyle) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::builder().parse_lossy(std::env::var(LOG_ENV).unwrap_or_default());
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match style {
        LogStyle::Flat => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogStyle::Tree => registry
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_writer(std::io::stderr)
                    .with_targets(true),
            )
            .try_init(),
    };

    if result.is_ok() {
        log_debug!("Logging initialized");
    }
}
