//! Terminal chat with the farm-advice assistant.

mod cli;
mod repl;

use std::error::Error;

use clap::Parser as _;
use farmwise_chat::observability::init_observability;
use farmwise_chat::{ChatClient, Conversation};
use tokio::io::BufReader;

use crate::cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_observability(&cli.log_config())?;

    let client = ChatClient::from_config(cli.chat_config()?)?;
    let mut conversation = Conversation::new();
    let mut stdout = std::io::stdout();

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let stdin = BufReader::new(tokio::io::stdin());
            let failures = repl::run_chat(&client, &mut conversation, stdin, &mut stdout).await?;
            tracing::info!(failures, messages = conversation.len(), "chat session ended");
        }
        Command::Ask { question } => {
            let outcome =
                repl::ask(&client, &mut conversation, &question.join(" "), &mut stdout).await?;
            repl::outcome_result(outcome)?;
        }
    }
    Ok(())
}
