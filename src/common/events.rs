use crate::common::types::Message;

/// Events a chat session pushes to whoever renders it.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    MessageAppended(Message),
}
