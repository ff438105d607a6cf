//! Interactive chat with the portfolio assistant.
//!
//! This binary is a terminal front end for the same session that backs the
//! website's chat widget: the session identifier is persisted locally, every
//! message is sent with the last ten transcript entries as context, and failed
//! turns surface as short notices.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local backend
//! portfolio-chat
//!
//! # Talk to a deployed backend
//! portfolio-chat --api-url https://example.railway.app/api/v1
//!
//! # Load settings from a YAML file and disable colors
//! portfolio-chat --config chat.yaml --no-color
//! ```
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/session` - Show the session identifier
//! - `/stats` - Show session statistics
//! - `/quota` - Show remaining request quota
//! - `/quit` - Exit the application
//!
//! Pressing Ctrl+C while a reply is pending closes the chat; the late reply is discarded.
//! Ctrl+C during `/quota` or `/health` abandons just that query.
//!
//! Diagnostics go to stderr through `env_logger`; set `RUST_LOG` to adjust.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::Notify;

use portfolio_chat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, SubmitOutcome, TerminalView, help_text,
    parse_command,
};
use portfolio_chat::{ChatClient, FileStore, MemoryStore, SessionStore};

/// Main entry point for the portfolio-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (args, _) = ChatArgs::from_command_line_relaxed("portfolio-chat [OPTIONS]");
    let config = ChatConfig::resolve(args)?;

    let client = ChatClient::with_options(&config.api_url, config.timeout)?;
    let mut store: Box<dyn SessionStore> = match &config.store_path {
        Some(path) => Box::new(FileStore::open(path)?),
        None => Box::new(MemoryStore::new()),
    };
    let session = ChatSession::initialize(client, store.as_mut(), &config)?;
    let mut view = TerminalView::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    // Set by Ctrl+C; the notify wakes whatever is currently awaited.
    let interrupt = Arc::new(Interrupt::default());
    let interrupt_clone = interrupt.clone();
    ctrlc::set_handler(move || {
        interrupt_clone.raise();
    })?;

    println!("Portfolio Chat ({})", session.transport().base_url());
    println!("Type /help for commands, /quit to exit\n");
    if let Some(greeting) = &config.greeting {
        view.print_assistant(greeting);
    }

    loop {
        // Reset interrupt flag before each input
        interrupt.reset();

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Session => {
                            view.print_info(&format!("Session: {}", session.session_id()));
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::History => {
                            for entry in session.transcript() {
                                println!("    [{}] {}: {}", entry.timestamp, entry.role, entry.content);
                            }
                        }
                        ChatCommand::SaveTranscript(path) => {
                            match session.save_transcript_to(&path) {
                                Ok(_) => {
                                    view.print_info(&format!("Transcript saved to {}", path))
                                }
                                Err(err) => view
                                    .print_error(&format!("Failed to save transcript: {}", err)),
                            }
                        }
                        ChatCommand::Quota => match interrupt
                            .guard(session.transport().quota())
                            .await
                        {
                            None => println!("\n[interrupted]"),
                            Some(Ok(quota)) => {
                                let q = quota.quota;
                                println!(
                                    "    Minute: {}/{} remaining (resets {})",
                                    q.minute.remaining, q.minute.limit, q.minute.reset_at
                                );
                                println!(
                                    "    Hour: {}/{} remaining (resets {})",
                                    q.hour.remaining, q.hour.limit, q.hour.reset_at
                                );
                            }
                            Some(Err(err)) => {
                                view.print_error(&format!("Quota unavailable: {}", err))
                            }
                        },
                        ChatCommand::Health => match interrupt
                            .guard(session.transport().health())
                            .await
                        {
                            None => println!("\n[interrupted]"),
                            Some(Ok(health)) => view.print_info(&format!(
                                "Backend {} (version {}, {})",
                                health.status,
                                health.version.as_deref().unwrap_or("unknown"),
                                health.environment.as_deref().unwrap_or("unknown"),
                            )),
                            Some(Err(err)) => {
                                view.print_error(&format!("Health check failed: {}", err))
                            }
                        },
                        ChatCommand::Invalid(message) => {
                            view.print_error(&message);
                        }
                    }
                    continue;
                }

                match interrupt.guard(session.submit(line, &mut view)).await {
                    Some(SubmitOutcome::Ignored) => {
                        view.print_info("(still waiting for the previous reply)");
                    }
                    Some(_) => {}
                    None => {
                        session.detach();
                        println!("\n[closed]");
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                view.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Ctrl+C state shared between the signal handler and the REPL.
#[derive(Default)]
struct Interrupt {
    raised: AtomicBool,
    notify: Notify,
}

impl Interrupt {
    fn raise(&self) {
        self.raised.store(true, Ordering::Relaxed);
        self.notify.notify_waiters();
    }

    fn reset(&self) {
        self.raised.store(false, Ordering::Relaxed);
    }

    /// Runs `fut` to completion, or returns `None` if Ctrl+C arrives first.
    async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        // Registered before the flag check so a raise in between is not lost.
        let notified = self.notify.notified();
        if self.raised.load(Ordering::Relaxed) {
            return None;
        }
        tokio::select! {
            output = fut => Some(output),
            _ = notified => None,
        }
    }
}

fn print_stats(session: &ChatSession<ChatClient>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Session: {}", stats.session_id);
    println!(
        "      Messages: {} ({} from you, {} replies)",
        stats.message_count, stats.user_messages, stats.assistant_messages
    );
    println!("      Failed turns: {}", stats.failed_turns);
    println!("      Context window: {} entries", stats.context_window);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn raise_without_waiter_is_cleared_by_reset() {
        let interrupt = Interrupt::default();
        interrupt.raise();
        assert_eq!(interrupt.guard(async { 1 }).await, None);

        interrupt.reset();
        assert_eq!(interrupt.guard(async { 2 }).await, Some(2));
    }

    #[tokio::test]
    async fn raise_cancels_pending_future() {
        let interrupt = Arc::new(Interrupt::default());
        let raiser = interrupt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            raiser.raise();
        });
        let pending = interrupt.guard(std::future::pending::<()>());
        assert!(
            tokio::time::timeout(Duration::from_secs(5), pending)
                .await
                .unwrap()
                .is_none()
        );
    }
}
