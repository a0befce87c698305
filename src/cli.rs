use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lectary")]
#[command(author, version, about = "Telegram bot for sharing, tagging and rating study materials", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
