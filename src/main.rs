//! postforge CLI: robot and 5-axis CNC program generation.

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "postforge",
    version,
    about = "Motion programs to ABB RAPID, KUKA KRL and 5-axis G-code, with automatic splitting of oversized programs"
)]
struct Cli {
    #[command(subcommand)]
    command: postforge::cli::Commands,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = postforge::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
