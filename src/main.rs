//! Restaurant Admin CLI
//!
//! Inspects and seeds the server's document store and issues session tokens
//! for manual API testing.
//!
//! # Usage
//!
//! ```bash
//! restaurant food list --provider chef@example.com
//! restaurant food add --file pad-thai.json
//! restaurant order list --email buyer@example.com
//! restaurant token issue buyer@example.com
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{ConfigCommand, FoodCommand, OrderCommand, TokenCommand};
use restaurant::config::Config;
use restaurant::db::{init_db, Collection, FOODS, ORDERS};

#[derive(Parser)]
#[command(name = "restaurant")]
#[command(version)]
#[command(about = "Restaurant server administration tool", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and add food items
    Food(FoodCommand),

    /// Inspect orders
    Order(OrderCommand),

    /// Issue and check session tokens
    Token(TokenCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Food(cmd)) => {
            let pool = init_db(&config.database_path).await?;
            cmd.run(&Collection::new(pool, FOODS)).await?;
        }
        Some(Commands::Order(cmd)) => {
            let pool = init_db(&config.database_path).await?;
            cmd.run(&Collection::new(pool, ORDERS)).await?;
        }
        Some(Commands::Token(cmd)) => {
            cmd.run(&config)?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
