use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::OutputFormat;
use restaurant::db::{Collection, Document, Filter, FindOptions};
use restaurant::models::{Food, StoredFood, PROVIDER_EMAIL, SOLD_ITEMS};
use restaurant::server::foods::TOP_FOODS_LIMIT;

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// List food items
    List {
        /// Only show foods from this provider
        #[arg(long, value_name = "EMAIL")]
        provider: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the best-selling food items
    Top {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Count food items
    Count,

    /// Add a food item from a JSON file
    Add {
        /// Path to a JSON document with the food's fields
        #[arg(long)]
        file: PathBuf,
    },
}

impl FoodCommand {
    pub async fn run(&self, foods: &Collection) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FoodSubcommand::List { provider, format } => {
                let filter = match provider {
                    Some(email) => Filter::new().eq(PROVIDER_EMAIL, email.clone()),
                    None => Filter::new(),
                };
                let docs = foods.find(&filter, &FindOptions::new()).await?;
                print_foods(docs, format)
            }
            FoodSubcommand::Top { format } => {
                let options = FindOptions::new()
                    .sort_desc(SOLD_ITEMS)
                    .limit(TOP_FOODS_LIMIT);
                let docs = foods.find(&Filter::new(), &options).await?;
                print_foods(docs, format)
            }
            FoodSubcommand::Count => {
                println!("{}", foods.count().await?);
                Ok(())
            }
            FoodSubcommand::Add { file } => {
                let contents = std::fs::read_to_string(file)?;
                let food: Food = serde_json::from_str(&contents)?;
                if food.food_name.trim().is_empty() {
                    return Err("Food name cannot be empty".into());
                }

                let result = foods.insert_one(food.to_document()?).await?;
                println!("Added food: {} ({})", food.food_name, result.inserted_id);
                Ok(())
            }
        }
    }
}

fn print_foods(docs: Vec<Document>, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
        OutputFormat::Text => {
            if docs.is_empty() {
                println!("No foods found.");
                return Ok(());
            }

            println!(
                "{:<38} {:<30} {:<30} {:>8}",
                "ID", "NAME", "PROVIDER", "SOLD"
            );
            println!("{}", "-".repeat(109));

            let total = docs.len();
            for doc in docs {
                let stored = StoredFood::from_document(doc)?;
                println!(
                    "{:<38} {:<30} {:<30} {:>8}",
                    stored.id,
                    stored.food.food_name,
                    stored.food.provider_email,
                    stored.food.sold_items
                );
            }

            println!();
            println!("Total: {} food(s)", total);
        }
    }
    Ok(())
}
