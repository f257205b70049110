use tracing_subscriber::{EnvFilter, fmt};

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Fails only when a subscriber is already installed, which is fine.
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
