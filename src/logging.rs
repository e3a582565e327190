use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber for the CLI.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level
/// (negative = warn, 0 = info, 1 = debug, 2+ = trace). Output goes to stderr
/// so stdout stays clean for `--json`.
pub fn init(verbosity: i8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_level = match verbosity {
        i8::MIN..=-1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
