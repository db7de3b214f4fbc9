//! Reset command - clear conversation history.

use crate::cli::Output;
use crate::config::Settings;
use crate::memory::ConversationId;
use crate::runtime::Runtime;

/// Clear the history of one conversation.
pub async fn run_reset(conversation: Option<String>, settings: Settings) -> anyhow::Result<()> {
    let runtime = Runtime::new(settings)?;
    let conversation = conversation
        .map(ConversationId::new)
        .unwrap_or_default();

    let status = runtime.store().clear(&conversation).await;
    Output::success(&status);

    Ok(())
}
