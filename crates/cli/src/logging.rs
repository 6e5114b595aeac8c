use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level is `warn`, raised to `info`
/// by `-v` and `debug` by `-vv`.
pub fn setup_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    tracing::debug!("logging ready");
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
