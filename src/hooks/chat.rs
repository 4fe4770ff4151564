use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{authorize, notify::Notifier, Toast};
use crate::{
    auth::Session,
    error::AppResult,
    functions::assistant::{self, AssistantRequest, HistoryMessage},
    state::AppState,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// AI assistant conversation. History lives only as long as the hook.
pub struct ChatHook {
    state: AppState,
    notifier: Arc<dyn Notifier>,
    turns: Vec<ChatTurn>,
    conversation_id: Option<String>,
    sending: bool,
    error: Option<String>,
}

impl ChatHook {
    pub fn new(state: AppState, session: &Session, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        authorize(&state, session)?;
        Ok(Self {
            state,
            notifier,
            turns: Vec::new(),
            conversation_id: None,
            sending: false,
            error: None,
        })
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sends `message` with the prior turns; the user turn is kept even when the call fails.
    pub async fn send(&mut self, message: &str) -> Option<String> {
        let history = self
            .turns
            .iter()
            .map(|t| HistoryMessage {
                role: t.role.clone(),
                content: t.content.clone(),
            })
            .collect();
        self.turns.push(ChatTurn {
            role: "user".into(),
            content: message.to_string(),
        });

        self.sending = true;
        let result = assistant::chat(
            &self.state,
            AssistantRequest {
                message: message.to_string(),
                conversation_history: history,
            },
        )
        .await;
        self.sending = false;

        match result {
            Ok(reply) => {
                self.error = None;
                self.conversation_id = Some(reply.conversation_id);
                self.turns.push(ChatTurn {
                    role: "assistant".into(),
                    content: reply.response.clone(),
                });
                Some(reply.response)
            }
            Err(e) => {
                let message = e.to_string();
                self.notifier
                    .notify(Toast::error("Assistant unavailable", message.clone()));
                self.error = Some(message);
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.conversation_id = None;
        self.error = None;
    }
}
