use clap::Parser;

use cascade::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let args = Cli::parse();

    let result = match &args.command {
        Commands::Run => cli::run::run(&args.config).await,
        Commands::Check => cli::check::check(&args.config, args.json),
        Commands::Consumers(consumers) => {
            cli::consumers::handle(&consumers.admin_url, &consumers.command, args.json).await
        }
    };

    if let Err(e) = result {
        cli::output::failure(&format!("{e:#}"));
        std::process::exit(1);
    }
}
