use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Conversation, HistoryBucket, Message, SelectableUser};

// -- JWT Claims --

/// Bearer token claims. `sub` is the session user's sharer id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub to_username: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub ok: bool,
    pub message: Message,
}

#[derive(Debug, Serialize)]
pub struct RecipientsResponse {
    pub users: Vec<SelectableUser>,
}

#[derive(Debug, Serialize)]
pub struct InboxResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub unread: u64,
}

// -- Delete --

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// `true` while the deletion still awaits confirmation.
    pub confirm: bool,
    pub message: Message,
}

// -- History --

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryRequest {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryBucket>,
    pub users: Vec<SelectableUser>,
    pub selected_from: Option<String>,
    pub selected_to: Option<String>,
}
