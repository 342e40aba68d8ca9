use crate::ui::ProgressLogWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Default directive for a given `-v` count and `--quiet` flag.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "office2md=warn";
    }

    match verbose {
        0 => "office2md=info",
        1 => "office2md=debug",
        _ => "office2md=trace",
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the verbosity flags.
///
/// Log lines go to stderr through `writer`, so active progress bars are
/// cleared while a line is printed.
pub fn init(verbose: u8, quiet: bool, use_ansi: bool, writer: ProgressLogWriter) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let result = tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_ansi(use_ansi),
        )
        .try_init();

    // Already installed when the library is embedded; keep that subscriber
    if let Err(e) = result {
        tracing::debug!("Tracing subscriber not installed: {}", e);
    }
}
