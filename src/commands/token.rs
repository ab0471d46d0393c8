use clap::{Args, Subcommand};

use restaurant::config::Config;
use restaurant::server::TokenService;

#[derive(Args)]
pub struct TokenCommand {
    #[command(subcommand)]
    pub command: TokenSubcommand,
}

#[derive(Subcommand)]
pub enum TokenSubcommand {
    /// Issue a session token for an email
    Issue {
        /// Email to embed in the token
        email: String,
    },
    /// Check a session token and print its email
    Verify {
        /// Token as sent in the `token` cookie
        token: String,
    },
}

impl TokenCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let secret = config
            .token_secret
            .as_deref()
            .ok_or("token_secret is not configured (set RESTAURANT_TOKEN_SECRET)")?;
        let tokens = TokenService::new(secret.as_bytes())?;

        match &self.command {
            TokenSubcommand::Issue { email } => {
                println!("{}", tokens.issue(email)?);
            }
            TokenSubcommand::Verify { token } => {
                let claims = tokens.verify(token)?;
                let expires = chrono::DateTime::from_timestamp(claims.exp, 0)
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| claims.exp.to_string());
                println!("email: {}", claims.email);
                println!("expires: {}", expires);
            }
        }
        Ok(())
    }
}
