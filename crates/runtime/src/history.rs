//! Visible transcript kept by a front end for one visitor.
//!
//! Lives entirely on the caller's side: the engine never stores it, it is
//! handed in as `history` on every turn.

use persona_llm::ChatMessage;

use crate::{ChatEngine, EngineError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSession {
    opening: Option<String>,
    turns: Vec<ChatMessage>,
}

impl ChatSession {
    /// Session seeded with a canned assistant greeting.
    pub fn with_opening(opening: impl Into<String>) -> Self {
        let opening = opening.into();
        Self {
            turns: vec![ChatMessage::assistant(opening.clone())],
            opening: Some(opening),
        }
    }

    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    /// Send `text` to the engine.  The user and assistant turns are only
    /// appended when the engine produced a reply.
    pub async fn submit(&mut self, engine: &ChatEngine, text: &str) -> Result<String, EngineError> {
        let reply = engine.chat(text, &self.turns).await?;
        self.turns.push(ChatMessage::user(text));
        self.turns.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    /// Forget everything except the greeting.
    pub fn reset(&mut self) {
        self.turns.clear();
        if let Some(opening) = &self.opening {
            self.turns.push(ChatMessage::assistant(opening.clone()));
        }
    }
}
