use clap::{Args, Subcommand};

use super::OutputFormat;
use restaurant::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        println!("port: {}", config.port);
                        println!("database_path: {}", config.database_path.display());
                        println!(
                            "token_secret: {}",
                            if config.token_secret.is_some() {
                                "(set)"
                            } else {
                                "(not set)"
                            }
                        );
                        println!("production: {}", config.production);
                    }
                }
                Ok(())
            }
        }
    }
}
