use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber. `RUST_LOG` takes precedence over `level`. Does nothing
/// when a subscriber is already installed.
pub fn init(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice() {
        init(Level::DEBUG);
        init(Level::INFO);
    }
}
