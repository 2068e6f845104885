use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod legends;

use legends::{
    fetch_legends, write_catalog, RefreshOptions, DEFAULT_BASE_URL, DEFAULT_CARD_TYPE,
    DEFAULT_OUT_PATH, DEFAULT_PAGE_SIZE,
};

#[derive(Parser)]
#[command(name = "riftbound-cli", version, about = "Maintenance tools for the Riftbound scoreboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Legends {
        #[command(subcommand)]
        command: LegendCommand,
    },
}

#[derive(Subcommand)]
enum LegendCommand {
    /// Refetch the legend catalog and rewrite the bundled JSON file.
    Update {
        #[arg(long, env = "LEGENDS_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,
        #[arg(long, env = "LEGENDS_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
        #[arg(long, env = "LEGENDS_OUT", default_value = DEFAULT_OUT_PATH)]
        out: PathBuf,
        #[arg(long, default_value = DEFAULT_CARD_TYPE)]
        card_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Legends { command } => match command {
            LegendCommand::Update {
                base_url,
                page_size,
                out,
                card_type,
            } => {
                let options = RefreshOptions {
                    base_url,
                    page_size: page_size.max(1),
                    card_type,
                };
                let client = reqwest::Client::builder().build()?;
                let legends = fetch_legends(&client, &options).await?;
                write_catalog(&out, &legends).await?;
                info!(count = legends.len(), path = %out.display(), "catalog written");
                println!("Wrote {} legends to {}", legends.len(), out.display());
            }
        },
    }

    Ok(())
}
