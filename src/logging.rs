// src/logging.rs
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so they never interleave with the chat transcript.
pub fn init_tracing() {
    let filter = std::env::var("CHAT_LOG")
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info,chatbot_frontend=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
