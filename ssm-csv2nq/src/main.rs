use clap::Parser;
use ssm_csv2nq::cli::Cli;
use ssm_csv2nq::error::{exit_with_error, CliError, CliResult};
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

fn init_tracing(cli: &Cli) -> CliResult<()> {
    // Console policy:
    //   --quiet  → "off"
    //   default  → RUST_LOG if set, otherwise "info"
    // The log file always gets debug events, whatever the console shows.
    let console_filter = if cli.quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    let console = fmt::layer()
        .with_ansi(cli.color_enabled())
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file = match &cli.log {
        Some(path) => {
            let log_file = File::create(path).map_err(|e| {
                CliError::Config(format!("cannot open log file {}: {e}", path.display()))
            })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(log_file))
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if cli.tool_version {
        println!("csv2nq {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if !cli.color_enabled() {
        colored::control::set_override(false);
    }

    if let Err(e) = init_tracing(&cli) {
        exit_with_error(e);
    }

    if let Err(e) = ssm_csv2nq::run(&cli) {
        exit_with_error(e);
    }
}
