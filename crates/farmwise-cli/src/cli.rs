use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use farmwise_chat::observability::LogConfig;
use farmwise_chat::{ChatConfig, ChatError};

#[derive(Parser, Debug)]
#[command(
    name = "farmwise",
    version,
    about = "Ask the farm-advice assistant from your terminal"
)]
pub struct Cli {
    /// Full chat endpoint URL (overrides FARMWISE_CHAT_URL / FARMWISE_API_BASE_URL).
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Bearer key for the chat endpoint (overrides FARMWISE_API_KEY).
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds (overrides FARMWISE_TIMEOUT_SECS).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Log filter used when FARMWISE_LOG_LEVEL and RUST_LOG are unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Write JSON log lines to this file instead of stderr (overrides FARMWISE_JSON_LOG_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_json: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat session (default).
    Chat,
    /// Ask one question and print the streamed answer.
    Ask {
        /// Question text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

impl Cli {
    /// Logging settings: environment on top of `--log-level`, then `--log-json`.
    pub fn log_config(&self) -> LogConfig {
        let config = LogConfig::from_env(&self.log_level);
        match &self.log_json {
            Some(path) => config.json_file(path.clone()),
            None => config,
        }
    }

    /// Resolves the endpoint config: flags first, then the environment.
    pub fn chat_config(&self) -> Result<ChatConfig, ChatError> {
        let mut config = match self.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => {
                let mut config = ChatConfig::new(endpoint);
                if let Ok(key) = std::env::var("FARMWISE_API_KEY")
                    && !key.trim().is_empty()
                {
                    config = config.api_key(key.trim());
                }
                config
            }
            _ => ChatConfig::from_env()?,
        };
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config = config.api_key(key.trim());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_interactive_chat() {
        let cli = Cli::try_parse_from(["farmwise"]).expect("parse");
        assert_eq!(cli.command, None);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn ask_collects_question_words() {
        let cli = Cli::try_parse_from(["farmwise", "ask", "when", "to", "sow", "maize?"])
            .expect("parse");
        assert_eq!(
            cli.command,
            Some(Command::Ask {
                question: vec!["when".into(), "to".into(), "sow".into(), "maize?".into()]
            })
        );
    }

    #[test]
    fn log_json_flag_selects_file_output() {
        use farmwise_chat::observability::LogOutput;

        let cli = Cli::try_parse_from(["farmwise", "--log-json", "logs/chat.jsonl", "chat"])
            .expect("parse");
        assert_eq!(
            cli.log_config().output,
            LogOutput::JsonFile(PathBuf::from("logs/chat.jsonl"))
        );
    }

    #[test]
    fn ask_requires_a_question() {
        assert!(Cli::try_parse_from(["farmwise", "ask"]).is_err());
    }

    #[test]
    fn flags_override_endpoint_and_timeout() {
        let cli = Cli::try_parse_from([
            "farmwise",
            "--endpoint",
            "http://localhost:8080/chat",
            "--api-key",
            "k",
            "--timeout-secs",
            "5",
            "chat",
        ])
        .expect("parse");
        let config = cli.chat_config().expect("config");
        assert_eq!(config.endpoint, "http://localhost:8080/chat");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
