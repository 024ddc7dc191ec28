use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. Dependencies stay at `warn`.
pub fn default_directive(verbose: u8, quiet: bool) -> String {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level)
}

pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));
    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "../tests/src_inline/logging.rs"]
mod tests;
