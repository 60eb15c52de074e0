//! Multi-turn conversation command.
//!
//! The session lives for the duration of the process; every turn is sent
//! with the history accumulated so far.

use std::io::Write;

use parley_config::Config;
use parley_conversation::{ConversationError, ConversationManager, HistoryStats, TurnResult};
use parley_core::{DecisionPolicy, LLMProvider};
use tracing::{debug, info};
use uuid::Uuid;

use super::repl::ReplCommand;
use super::{build_conversation_config, build_provider};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Session ID to use (a new one is generated when not provided)
    pub session_id: Option<Uuid>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Optional steering context override
    pub context: Option<String>,
    /// Skip structured output for every turn
    pub free_text: bool,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let provider = build_provider(&config);

        let session_id = input.session_id.unwrap_or_else(Uuid::now_v7);
        let mut conversation_config =
            build_conversation_config(&config, session_id, input.model, input.context);
        if input.free_text {
            conversation_config = conversation_config.with_decision(DecisionPolicy::Never);
        }

        info!(
            "Starting conversation session: {session_id} (model: {})",
            conversation_config.model
        );
        let mut manager = ConversationManager::new(provider, conversation_config);

        if let Some(msg) = input.message {
            let result = manager.submit_question(&msg).await?;
            print_turn(&result);
            info!("Turn {} completed.", result.turn_number);
        } else {
            run_interactive(&mut manager).await?;
            info!(
                "Conversation ended: {} total messages",
                manager.snapshot().message_count()
            );
        }

        Ok(())
    }
}

async fn run_interactive<P: LLMProvider>(
    manager: &mut ConversationManager<P>,
) -> anyhow::Result<()> {
    println!("=== Conversation Session: {} ===", manager.config().session_id);
    println!("Type /help for commands, 'exit' or Ctrl+C to end the session.\n");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match ReplCommand::parse(input) {
            None => match manager.submit_question(input).await {
                Ok(result) => print_turn(&result),
                // The failure was already recorded as the assistant's reply.
                Err(ConversationError::Provider(e)) => eprintln!("\nError: {e}\n"),
                Err(e) => eprintln!("Error: {e}"),
            },
            Some(ReplCommand::Exit) => break,
            Some(ReplCommand::Clear) => {
                manager.clear_history();
                println!("History cleared.\n");
            }
            Some(ReplCommand::Context(Some(text))) => {
                manager.set_context(text);
                println!("Context updated.\n");
            }
            Some(ReplCommand::Context(None)) => {
                let context = manager.snapshot().context();
                if context.is_empty() {
                    println!("(no context set)\n");
                } else {
                    println!("{context}\n");
                }
            }
            Some(ReplCommand::History) => print_transcript(manager),
            Some(ReplCommand::Summaries) => {
                let summaries = manager.snapshot().structured_summaries();
                println!("{}\n", serde_json::to_string_pretty(summaries)?);
            }
            Some(ReplCommand::Help) => println!("{}", ReplCommand::help_text()),
            Some(ReplCommand::Unknown(name)) => {
                println!("Unknown command: /{name}. Type /help for the list.\n");
            }
        }
    }

    println!(
        "\nSession ended. Total turns: {}",
        manager.snapshot().turn_count()
    );
    Ok(())
}

fn print_turn(result: &TurnResult) {
    println!("\n{}\n", result.display_text);
    if let Some(ref summary) = result.summary {
        debug!(
            "Turn {} structured summary: ok={}, payload={}",
            result.turn_number, summary.ok, summary.payload
        );
    }
}

fn print_transcript<P: LLMProvider>(manager: &ConversationManager<P>) {
    let state = manager.snapshot();
    if state.is_empty() {
        println!("(no messages yet)\n");
        return;
    }
    for message in state.messages() {
        println!("[{}] {}", message.role(), message.text());
    }

    let stats = HistoryStats::collect(state.messages());
    println!(
        "\n{} messages ({} user, {} assistant), {} chars, ~{} tokens\n",
        stats.total_messages,
        stats.user_messages,
        stats.assistant_messages,
        stats.total_characters,
        stats.estimated_tokens
    );
}
