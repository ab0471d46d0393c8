use clap::{Args, Subcommand};

use super::OutputFormat;
use restaurant::db::{Collection, Filter, FindOptions, ID_FIELD};
use restaurant::models::BUYER_EMAIL;

#[derive(Args)]
pub struct OrderCommand {
    #[command(subcommand)]
    pub command: OrderSubcommand,
}

#[derive(Subcommand)]
pub enum OrderSubcommand {
    /// List the orders placed by one buyer
    List {
        /// Buyer's email address
        #[arg(long)]
        email: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl OrderCommand {
    pub async fn run(&self, orders: &Collection) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            OrderSubcommand::List { email, format } => {
                let filter = Filter::new().eq(BUYER_EMAIL, email.clone());
                let docs = orders.find(&filter, &FindOptions::new()).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&docs)?);
                    }
                    OutputFormat::Text => {
                        if docs.is_empty() {
                            println!("No orders for {}.", email);
                            return Ok(());
                        }
                        for doc in &docs {
                            let id = doc.get(ID_FIELD).and_then(|v| v.as_str()).unwrap_or("?");
                            let details: Vec<String> = doc
                                .iter()
                                .filter(|(key, _)| key.as_str() != ID_FIELD && key.as_str() != BUYER_EMAIL)
                                .map(|(key, value)| format!("{}={}", key, value))
                                .collect();
                            println!("{}  {}", id, details.join(" "));
                        }
                        println!();
                        println!("Total: {} order(s)", docs.len());
                    }
                }
                Ok(())
            }
        }
    }
}
