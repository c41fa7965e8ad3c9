mod lookup;
mod moderation;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::lookup::LookupOptions;

#[derive(Debug, Parser)]
#[command(name = "saferoute-cli")]
#[command(about = "Find nearby bomb shelters and manage shelter submissions")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find shelters near a position and show the closest one
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        #[command(flatten)]
        options: LookupOptions,
        /// Print the aggregation result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read `lat,lon` lines from stdin and keep the nearest shelter up to date
    Follow {
        #[command(flatten)]
        options: LookupOptions,
    },
    /// Submit a shelter for moderation
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Create a moderation administrator in the database
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SAFEROUTE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = saferoute_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Nearby {
            latitude,
            longitude,
            options,
            json,
        }) => lookup::run_nearby(&config, latitude, longitude, &options, json).await?,
        Some(Commands::Follow { options }) => lookup::run_follow(&config, &options).await?,
        Some(Commands::Submit {
            name,
            latitude,
            longitude,
            description,
        }) => moderation::run_submit(&config, name, latitude, longitude, description).await?,
        Some(Commands::CreateAdmin { username, password }) => {
            moderation::run_create_admin(&config, &username, &password).await?;
        }
        None => println!("saferoute-cli: run with --help to see available commands"),
    }

    Ok(())
}
