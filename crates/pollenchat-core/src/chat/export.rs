use crate::chat::message::Message;
use crate::chat::state::ChatState;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const EMPTY_TRANSCRIPT: &str = "No messages yet.";

/// Plain-text transcript. Message times are rendered in the time zone of
/// `generated_at`.
pub fn render_text<Tz>(state: &ChatState, generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if state.messages.is_empty() {
        return EMPTY_TRANSCRIPT.to_string();
    }

    let tz = generated_at.timezone();
    let body = state
        .messages
        .iter()
        .map(|m| {
            format!(
                "[{}] {}: {}",
                format_millis(&tz, m.timestamp),
                m.role.label(),
                m.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Chat transcript\nGenerated: {}\n\n{}",
        generated_at.format(TIME_FORMAT),
        body
    )
}

fn format_millis<Tz>(tz: &Tz, millis: i64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format(TIME_FORMAT).to_string(),
        None => millis.to_string(),
    }
}

/// JSON export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExport {
    pub export_time: String,
    pub conversation_id: Option<String>,
    pub message_count: usize,
    pub messages: Vec<Message>,
}

impl ChatExport {
    pub fn from_state(state: &ChatState, exported_at: DateTime<Utc>) -> Self {
        Self {
            export_time: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            conversation_id: state.conversation_id.clone(),
            message_count: state.messages.len(),
            messages: state.messages.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
