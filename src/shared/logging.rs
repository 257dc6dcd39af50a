use super::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// tracing サブスクライバを初期化する。
///
/// `RUST_LOG` が設定されていればそちらを優先し、なければ設定値のフィルタを使う。
/// 既にグローバルサブスクライバが設定済みの場合は何もしない。
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.as_str()));

    let result = if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(false)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    if result.is_ok() {
        tracing::info!(json = config.json, "logging initialized");
    }
}
