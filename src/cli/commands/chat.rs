//! Interactive chat command.

use crate::cli::Output;
use crate::config::Settings;
use crate::memory::ConversationId;
use crate::runtime::Runtime;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(
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

    println!("\n{}", style("Torii").bold().cyan());
    println!(
        "{}\n",
        style("Type your messages, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            let status = agent.reset().await;
            Output::info(&status);
            continue;
        }

        let response = agent.handle(input).await;
        println!("\n{} {}\n", style("Torii:").cyan().bold(), response);
    }

    Ok(())
}
