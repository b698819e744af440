use clap::Parser;
use topic_evolution_api::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Migrate(args) => cli::migrate::run(args).await,
        Command::ImportModel(args) => cli::import::run_model(args).await,
        Command::ImportComparison(args) => cli::import::run_comparison(args).await,
        Command::Analyze(args) => cli::analyze::run(args).await,
    }
}
