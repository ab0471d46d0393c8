mod config_cmd;
mod food;
mod order;
mod token;

pub use config_cmd::ConfigCommand;
pub use food::FoodCommand;
pub use order::OrderCommand;
pub use token::TokenCommand;

use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
