use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
}

/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Clear the conversation (after confirmation).
    Clear,
    /// Retry a failed message; `None` means the most recent one.
    Retry(Option<String>),
    /// Dismiss the current error.
    Dismiss,
    ShowStats,
    /// Export the transcript, to stdout or to `path`.
    Export {
        format: ExportFormat,
        path: Option<PathBuf>,
    },
    ListModels,
    /// Probe the completion endpoint.
    Ping,
    /// Print the whole transcript.
    ShowHistory,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    if !input.starts_with('/') {
        return CommandResult::NotACommand;
    }

    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/clear" => CommandResult::Clear,
        "/retry" => {
            if arg.is_empty() {
                CommandResult::Retry(None)
            } else {
                CommandResult::Retry(Some(arg.to_string()))
            }
        }
        "/dismiss" => CommandResult::Dismiss,
        "/stats" => CommandResult::ShowStats,
        "/export" => parse_export(arg),
        "/models" => CommandResult::ListModels,
        "/ping" => CommandResult::Ping,
        "/history" => CommandResult::ShowHistory,
        "/version" => CommandResult::Message(format!("pollenchat v{}", env!("CARGO_PKG_VERSION"))),
        _ => CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands.")),
    }
}

fn parse_export(arg: &str) -> CommandResult {
    const USAGE: &str = "Usage: /export text|json [path]";

    let mut words = arg.split_whitespace();
    let format = match words.next() {
        Some("text") | Some("txt") => ExportFormat::Text,
        Some("json") => ExportFormat::Json,
        _ => return CommandResult::Message(USAGE.into()),
    };
    let path = words.next().map(PathBuf::from);
    if words.next().is_some() {
        return CommandResult::Message(USAGE.into());
    }
    CommandResult::Export { format, path }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ pollenchat commands ──────────────────────────────────────────╮

  CONVERSATION
    /clear                    Clear the conversation (asks first)
    /retry [id]               Resend a failed message (default: latest)
    /dismiss                  Dismiss the current error
    /history                  Show the whole conversation
    /stats                    Show message counts

  EXPORT
    /export text|json [path]  Print or save the transcript

  ENDPOINT
    /models                   List available models
    /ping                     Check the endpoint is reachable

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit the application

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
