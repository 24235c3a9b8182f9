use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Accumulated dialogue state for one shopper. Messages are append-only;
/// `recommended_skus` is the deduplicated union across all turns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub store_id: String,
    pub user_id: String,
    pub messages: Vec<ConversationMessage>,
    pub recommended_skus: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(store_id: &str, user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId(Uuid::new_v4().to_string()),
            store_id: store_id.to_string(),
            user_id: user_id.to_string(),
            messages: Vec::new(),
            recommended_skus: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends one user/assistant exchange and unions the turn's newly
    /// recommended SKUs into the cumulative set.
    pub fn push_turn(&mut self, user_text: &str, assistant_text: &str, new_skus: &[String]) {
        let now = Utc::now();
        self.messages.push(ConversationMessage {
            role: MessageRole::User,
            content: user_text.to_string(),
            timestamp: now,
        });
        self.messages.push(ConversationMessage {
            role: MessageRole::Assistant,
            content: assistant_text.to_string(),
            timestamp: now,
        });
        for sku in new_skus {
            if !self.recommended_skus.contains(sku) {
                self.recommended_skus.push(sku.clone());
            }
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::Conversation;

    #[test]
    fn push_turn_appends_and_unions() {
        let mut conversation = Conversation::new("store-1", "user-1");
        conversation.push_turn("hang a picture", "try these", &["CMD-STRIPS-MED".to_string()]);
        conversation.push_turn(
            "anything stronger?",
            "these hold more",
            &["MONKEY-HOOK-50".to_string(), "CMD-STRIPS-MED".to_string()],
        );

        assert_eq!(conversation.messages.len(), 4);
        assert_eq!(conversation.recommended_skus, vec!["CMD-STRIPS-MED", "MONKEY-HOOK-50"]);
    }
}
