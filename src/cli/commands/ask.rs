//! One-shot ask command.

use crate::config::Settings;
use crate::memory::ConversationId;
use crate::runtime::Runtime;

/// Send a single message and print the reply.
pub async fn run_ask(
    message: &str,
    model: Option<String>,
    conversation: Option<String>,
    mut settings: Settings,
) -> anyhow::Result<()> {
    if let Some(model) = model {
        settings.llm.model = model;
    }

    let runtime = Runtime::new(settings)?;
    let conversation = conversation
        .map(ConversationId::new)
        .unwrap_or_default();
    let agent = runtime.agent_for(conversation);

    let response = agent.handle(message).await;
    println!("{}", response);

    Ok(())
}
