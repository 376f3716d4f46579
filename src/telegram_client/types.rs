use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Debug)]
pub struct GetChatRequest<'a> {
    pub chat_id: &'a str,
}

#[derive(Serialize, Debug)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

/// Envelope shared by every Bot API method.
#[derive(Deserialize, Debug)]
pub struct Response {
    pub ok: bool,
    pub result: Option<Value>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
}

// https://core.telegram.org/bots/api#chat
// only the fields the notifier looks at
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub username: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Message {
    pub message_id: i64,
    pub date: i64,
    pub chat: Chat,
    pub text: Option<String>,
}
