use anyhow::{bail, Context, Result};
use pollenchat_core::chat::SendOutcome;
use pollenchat_core::{ChatSession, ChatState, Settings};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::commands::{handle_command, CommandResult, ExportFormat};
use crate::render;

/// Send one prompt, print the reply and exit.
pub async fn run_single_prompt(settings: &Settings, prompt: &str) -> Result<()> {
    let session = settings.build_session()?;

    match session.send_message(prompt).await {
        SendOutcome::Delivered { reply, .. } => {
            println!("{}", reply.content);
            Ok(())
        }
        SendOutcome::Failed { error, .. } => bail!(error),
        SendOutcome::Rejected(rejection) => bail!(rejection.to_string()),
        SendOutcome::Abandoned { .. } => bail!("reply dropped"),
    }
}

pub async fn run_repl(settings: Settings) -> Result<()> {
    let session = settings.build_session()?;

    let restored = session.state().messages.len();
    println!(
        "pollenchat v{} (model: {}). Type /help for commands.",
        env!("CARGO_PKG_VERSION"),
        session.options().model
    );
    if restored > 0 {
        println!("Restored {restored} messages. Type /history to view them.");
    }

    let renderer = spawn_renderer(session.subscribe());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match handle_command(input) {
            CommandResult::NotACommand => {
                let outcome = session.send_message(input).await;
                notify(&outcome);
            }
            CommandResult::Quit => break,
            CommandResult::Message(text) => println!("{text}"),
            CommandResult::Clear => {
                let confirmed = confirm(&mut lines, "Clear the whole conversation? [y/N] ").await?;
                if !session.clear_messages(confirmed) {
                    println!("Nothing cleared.");
                }
            }
            CommandResult::Retry(target) => {
                let outcome = match target {
                    Some(id) => session.retry_message(&id).await,
                    None => session.retry_last_message().await,
                };
                notify(&outcome);
            }
            CommandResult::Dismiss => session.dismiss_error(),
            CommandResult::ShowStats => {
                println!("{}", render::format_stats(&session.get_message_stats()))
            }
            CommandResult::Export { format, path } => {
                if let Err(e) = export(&session, format, path.as_deref()) {
                    eprintln!("Export failed: {e:#}");
                }
            }
            CommandResult::ListModels => {
                println!("{}", render::format_models(&session.options().model))
            }
            CommandResult::Ping => {
                let reachable = settings.build_client().test_connection().await;
                if reachable {
                    println!("Endpoint reachable: {}", settings.api.base_url);
                } else {
                    println!("Endpoint unreachable: {}", settings.api.base_url);
                }
            }
            CommandResult::ShowHistory => println!("{}", render::format_history(&session.state())),
        }
    }

    // dropping the session closes the watch channel and ends the renderer
    drop(session);
    let _ = renderer.await;
    Ok(())
}

fn spawn_renderer(mut rx: watch::Receiver<ChatState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut seen = rx.borrow_and_update().clone();
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            for line in render::transition_lines(&seen, &next) {
                println!("{line}");
            }
            seen = next;
        }
    })
}

fn notify(outcome: &SendOutcome) {
    if let Some(notice) = render::outcome_notice(outcome) {
        println!("{notice}");
    }
}

async fn confirm(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> Result<bool> {
    println!("{question}");
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn export(session: &ChatSession, format: ExportFormat, path: Option<&std::path::Path>) -> Result<()> {
    let body = match format {
        ExportFormat::Text => session.export_as_text(),
        ExportFormat::Json => session.export_as_json()?,
    };

    match path {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}
