use clap::Subcommand;
use studify_core::assistant::AssistantClient;
use studify_core::config::AppConfig;

#[derive(Subcommand)]
pub enum AssistantAction {
    /// Ask the study assistant one question
    Ask { message: Vec<String> },
}

pub fn run(action: AssistantAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AssistantAction::Ask { message } => {
            let question = message.join(" ");
            if question.trim().is_empty() {
                return Err("nothing to ask".into());
            }
            let config = AppConfig::load_or_default();
            let client = AssistantClient::from_config(&config.assistant)?;
            println!("{}", client.ask_or_fallback(&[], &question));
        }
    }
    Ok(())
}
