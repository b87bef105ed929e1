use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Level comes from `HOLDINGS_LOG`, then
/// `RUST_LOG`, then `info`; `HOLDINGS_LOG_FORMAT=json` switches to JSON lines.
pub fn init() {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false);

    let result = match log_format().as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };

    // Already installed (tests, second binary entry point).
    let _ = result;
}

fn env_filter() -> EnvFilter {
    let level = std::env::var("HOLDINGS_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| std::env::var("RUST_LOG").ok());

    match level {
        Some(value) => EnvFilter::new(value),
        None => EnvFilter::new("info"),
    }
}

fn log_format() -> String {
    std::env::var("HOLDINGS_LOG_FORMAT")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "plain".to_string())
}
