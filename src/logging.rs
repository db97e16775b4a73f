//! Tracing subscriber setup for the `gcast` binary.
//!
//! Library code only emits events; the binary installs the subscriber once.
//! `RUST_LOG` takes precedence over the `--verbose` default.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // Logs go to stderr so reports and JSON on stdout stay clean.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "gompertz_forecast=debug,warn"
    } else {
        "gompertz_forecast=info,warn"
    }
}
