use serde::{Deserialize, Serialize};

/// Text message body accepted by chat-bot style webhooks:
/// `{"msgtype": "text", "text": {"content": "..."}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub msgtype: String,
    pub text: TextContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

impl WebhookMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            msgtype: "text".to_string(),
            text: TextContent {
                content: content.into(),
            },
        }
    }
}
