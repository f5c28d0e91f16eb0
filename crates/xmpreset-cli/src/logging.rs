use tracing_subscriber::EnvFilter;

/// Initialize tracing.
/// Calling this multiple times is safe (subsequent attempts are ignored).
pub fn init_tracing(verbose: bool) {
    // Prefer explicit verbose flag, otherwise fall back to RUST_LOG or default to warn
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
