use clap::Parser;
use tracing_subscriber::EnvFilter;

use diashow::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose, cli.quiet, !cli.no_color)?;

    cli.run()
}

/// `RUST_LOG` wins; otherwise `-v` shows debug and `-vv` trace output.
fn init_tracing(verbose: u8, quiet: bool, ansi: bool) -> anyhow::Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => {
            let level = match (quiet, verbose) {
                (true, _) => "error",
                (false, 0) => "warn",
                (false, 1) => "diashow=debug,info",
                (false, _) => "diashow=trace,debug",
            };
            EnvFilter::try_new(level)?
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .init();
    Ok(())
}

