//! Interactive REPL — feeds each line straight into the relay handler.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use kinrelay_agent::{RelayHandler, Replier};
use kinrelay_core::bus::InboundMessage;

use crate::helpers;

/// Channel name REPL messages are tagged with.
const REPL_CHANNEL: &str = "cli";

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Prints replies to the terminal.
struct TerminalReplier;

#[async_trait]
impl Replier for TerminalReplier {
    async fn reply(&self, text: &str) -> Result<()> {
        helpers::clear_waiting();
        helpers::print_reply(text);
        Ok(())
    }
}

pub async fn run(handler: Arc<RelayHandler>, user_id: &str) -> Result<()> {
    helpers::print_banner();
    println!("  Chatting as \"{user_id}\". /help lists commands, \"exit\" quits.");
    println!();

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_exit_command(trimmed) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(&input);

        debug!(user_id = %user_id, "processing input");
        helpers::print_waiting();
        let event = InboundMessage::new(REPL_CHANNEL, user_id, user_id, trimmed);
        handler.handle_event(&event, &TerminalReplier).await;
        helpers::clear_waiting();
    }

    save_history(&mut editor);
    Ok(())
}

fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_path() -> std::path::PathBuf {
    kinrelay_core::utils::get_history_path().join("chat_history")
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}
