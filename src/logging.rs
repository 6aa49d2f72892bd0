//! Tracing bootstrap for the CLI.

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Check if colored output should be used: stdout is a terminal and
/// `NO_COLOR` is not set.
fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug-level
/// engine output and the default keeps to info and warnings.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("rngrig=debug,info")
            } else {
                EnvFilter::try_new("rngrig=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_color())
                .compact(),
        )
        .try_init()?;

    Ok(())
}
