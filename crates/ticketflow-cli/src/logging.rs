//! Log subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `ticketflow` logs at info, or debug
/// with `--verbose`.
pub fn init(verbose: bool) {
    let default = if verbose {
        "ticketflow=debug"
    } else {
        "ticketflow=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
