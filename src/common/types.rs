use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A nearby radio contact as seen by the scanner.
///
/// The roster is fixed for the lifetime of a simulator; only `signal` and
/// `distance_meters` change, and only from the simulator's tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub handle: String,
    /// Simulated distance, always >= 1.
    pub distance_meters: u32,
    /// Signal strength in [0, 1].
    pub signal: f64,
}

/// Who authored a message in a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    Me,
    Contact,
}

/// Domain model for one chat message.
///
/// `text` is already sanitized; raw user input never reaches this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: MessageSender,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: MessageSender) -> Self {
        Self::with_timestamp(text, sender, Utc::now().timestamp_millis())
    }

    pub fn with_timestamp(text: impl Into<String>, sender: MessageSender, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            created_at,
        }
    }
}
