use clap::Parser;
use jules::cli::Cli;
use jules::error::format_api_error;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match jules::cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(verbose, rust_log.as_deref());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn describe(e: &anyhow::Error) -> String {
    match e.downcast_ref::<jules::Error>() {
        Some(api) if e.chain().count() == 1 => format_api_error(api),
        _ => format!("{e:#}"),
    }
}

/// `RUST_LOG` wins when it parses; `-v` only supplies the fallback.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    match rust_log.map(EnvFilter::try_new) {
        Some(Ok(filter)) => filter,
        _ if verbose => EnvFilter::new("jules=debug"),
        _ => EnvFilter::default(),
    }
}
