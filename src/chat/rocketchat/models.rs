use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::chat::models::{ChatMessage, Session};

pub const LOGIN_PATH: &str = "api/v1/login";
pub const CHANNELS_PATH: &str = "api/v1/channels.list.joined";
pub const POST_MESSAGE_PATH: &str = "api/v1/chat.postMessage";
pub const HISTORY_PATH: &str = "api/v1/channels.history";

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub user: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub auth_token: String,
    pub user_id: String,
}

impl LoginResponse {
    pub fn into_session(self) -> Option<Session> {
        if self.status != "success" {
            return None;
        }
        self.data.map(|data| Session {
            auth_token: data.auth_token,
            user_id: data.user_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelsResponse {
    #[serde(default)]
    pub channels: Vec<RawChannel>,
}

#[derive(Debug, Deserialize)]
pub struct RawChannel {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest<'a> {
    pub room_id: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

impl HistoryResponse {
    /// A page holding `requested` records may have left older messages on the server.
    pub fn is_full(&self, requested: u32) -> bool {
        usize::try_from(requested).is_ok_and(|requested| self.messages.len() >= requested)
    }

    /// Validated player messages of the page.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
            .into_iter()
            .filter_map(RawMessage::into_message)
            .collect()
    }
}

/// Message record as returned by the REST API. Every field is optional until validated.
#[derive(Debug, Deserialize)]
pub struct RawMessage {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub msg: Option<String>,
    pub ts: Option<RawTimestamp>,
    pub u: Option<RawUser>,
    /// System message type (user joined, topic changed...).
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawUser {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub username: Option<String>,
}

/// REST endpoints return ISO strings; some server versions still send `{"$date": millis}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Iso(String),
    Date {
        #[serde(rename = "$date")]
        millis: i64,
    },
}

impl RawTimestamp {
    pub fn parse(&self) -> Option<OffsetDateTime> {
        match self {
            RawTimestamp::Iso(value) => OffsetDateTime::parse(value, &Rfc3339).ok(),
            RawTimestamp::Date { millis } => {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(*millis) * 1_000_000).ok()
            }
        }
    }
}

impl RawMessage {
    /// Validate the record into a [`ChatMessage`]; system and malformed messages yield `None`.
    pub fn into_message(self) -> Option<ChatMessage> {
        if self.t.is_some() {
            return None;
        }
        let user = self.u?;
        Some(ChatMessage {
            id: self.id?,
            timestamp: self.ts?.parse()?,
            author_id: user.id?,
            author_name: user.username?,
            text: self.msg?,
        })
    }
}
