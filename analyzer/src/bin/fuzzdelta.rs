use anyhow::Result;
use clap::Parser;
use fuzzdelta::cli::{self, Cli};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing system based on CLI flags
fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = if let Some(ref custom) = cli.trace_filter {
        EnvFilter::try_new(custom)?
    } else if cli.trace {
        EnvFilter::new("debug,fuzzdelta=trace")
    } else if cli.debug {
        EnvFilter::new("warn,fuzzdelta=debug")
    } else if cli.verbose {
        EnvFilter::new("warn,fuzzdelta=info")
    } else {
        // Production default: only errors and warnings
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(cli.debug || cli.trace)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    info!("Starting fuzzdelta v{}", env!("CARGO_PKG_VERSION"));
    cli::run(&cli)
}
