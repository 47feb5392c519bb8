use std::io::Write as _;

use farmwise_chat::observability::{LogConfig, init_observability};
use farmwise_chat::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ChatError> {
    init_observability(&LogConfig::from_env("warn"))?;
    let client = ChatClient::from_config(ChatConfig::from_env()?)?;
    let mut conversation = Conversation::new();

    let mut print = |_id: MessageId, delta: &str, _content: &str| {
        print!("{delta}");
        let _ = std::io::stdout().flush();
    };
    match client
        .send(&mut conversation, "Crop rotation benefits", &mut print)
        .await
    {
        SendOutcome::Completed { .. } => println!(),
        SendOutcome::Failed { error } => eprintln!("chat error: {error}"),
        SendOutcome::Ignored => {}
    }
    Ok(())
}
