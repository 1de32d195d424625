//! propdash - headless linked-view dashboard over real-estate transactions.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "propdash",
    version,
    about = "Real-estate transactions dashboard toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: propdash_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("propdash {}", env!("CARGO_PKG_VERSION"));
    propdash_cmd::run(cli.command).await
}
