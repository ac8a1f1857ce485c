use serde::Serialize;
use std::time::Duration;

/// Immutable settings for one run, shared by every worker.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub workers: usize,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub interval: Option<Duration>,
    pub timeout: Option<Duration>,
}

impl RunConfig {
    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub fn payload(&self) -> ChatPayload {
        ChatPayload {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: self.prompt.clone(),
            }],
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatPayload {
    pub model: String,
    pub messages: Vec<Message>,
}
