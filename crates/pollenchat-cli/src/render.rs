use chrono::{Local, TimeZone};
use pollenchat_core::chat::SendOutcome;
use pollenchat_core::llm::{available_models, model_display_name};
use pollenchat_core::{ChatState, Message, MessageStats, MessageStatus};

pub fn format_message(message: &Message) -> String {
    let time = Local
        .timestamp_millis_opt(message.timestamp)
        .single()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let marker = match message.status {
        MessageStatus::Failed => " [failed]",
        MessageStatus::Sending => " [sending]",
        MessageStatus::Sent | MessageStatus::Received => "",
    };
    format!("[{time}] {}: {}{marker}", message.role.label(), message.content)
}

/// Lines to print when the published state moves from `prev` to `next`.
/// New user messages are not echoed; the user just typed them.
pub fn transition_lines(prev: &ChatState, next: &ChatState) -> Vec<String> {
    let mut lines = Vec::new();

    if next.messages.is_empty() && !prev.messages.is_empty() {
        lines.push("Conversation cleared.".to_string());
    }

    for message in &next.messages {
        match prev.find(&message.id) {
            None if !message.is_user() => lines.push(format_message(message)),
            Some(old) if old.status != message.status => {
                if message.status == MessageStatus::Failed {
                    lines.push("Message failed. Type /retry to resend it.".to_string());
                }
            }
            _ => {}
        }
    }

    if next.is_loading && !prev.is_loading {
        lines.push("...".to_string());
    }

    if next.error != prev.error {
        if let Some(error) = &next.error {
            lines.push(format!("Error: {error} (/dismiss to continue)"));
        }
    }

    lines
}

pub fn format_stats(stats: &MessageStats) -> String {
    format!(
        "Messages: {} total, {} from you, {} from the assistant, {} failed, {} sending",
        stats.total, stats.user, stats.assistant, stats.failed, stats.sending
    )
}

pub fn format_models(current: &str) -> String {
    let mut out = String::from("Available models:");
    for id in available_models() {
        let marker = if id == current { "*" } else { " " };
        out.push_str(&format!("\n  {marker} {id:<10} {}", model_display_name(id)));
    }
    out
}

pub fn format_history(state: &ChatState) -> String {
    if state.messages.is_empty() {
        return "No messages yet.".to_string();
    }
    state
        .messages
        .iter()
        .map(format_message)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Feedback for outcomes the state renderer does not already show.
pub fn outcome_notice(outcome: &SendOutcome) -> Option<String> {
    match outcome {
        SendOutcome::Rejected(rejection) => Some(format!("Not sent: {rejection}")),
        SendOutcome::Abandoned { .. } => Some("Reply dropped: conversation was cleared.".to_string()),
        SendOutcome::Delivered { .. } | SendOutcome::Failed { .. } => None,
    }
}
