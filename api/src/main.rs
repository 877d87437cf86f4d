mod cmd;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "ideaboard", about = "Ideas, projects and the people who work on them")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the API server
    Serve(ideaboard_api::config::Config),
    /// Administrative utilities
    Admin(cmd::admin::AdminArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    color_eyre::install()?;
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(config) => cmd::server::run(config).await?,
        Commands::Admin(args) => cmd::admin::admin_commands(args),
    }

    Ok(())
}
