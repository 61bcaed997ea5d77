use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info, warn};

use crate::{
    chat::{
        ChatTransport,
        models::{ChatMessage, Session},
        transport::TransportResult,
    },
    config::ChatConfig,
};

use super::{
    error::{RocketChatError, RocketChatResult},
    models::{
        CHANNELS_PATH, ChannelsResponse, HISTORY_PATH, HistoryResponse, LOGIN_PATH, LoginRequest,
        LoginResponse, POST_MESSAGE_PATH, PostMessageRequest, PostMessageResponse,
    },
};

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const USER_ID_HEADER: &str = "X-User-Id";

/// Rocket.Chat REST client bound to a logged-in session and a single channel.
#[derive(Clone)]
pub struct RocketChatClient {
    client: Client,
    base_url: Arc<str>,
    session: Arc<Session>,
    room_id: Arc<str>,
    history_count: u32,
}

impl RocketChatClient {
    /// Log in and resolve the configured channel.
    pub async fn connect(config: &ChatConfig) -> RocketChatResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RocketChatError::ClientBuilder { source })?;
        let base_url = Arc::<str>::from(config.server.trim_end_matches('/'));

        debug!(server = %base_url, username = %config.username, "trying to login");
        let session = login(&client, &base_url, &config.username, &config.password).await?;
        info!(user_id = %session.user_id, "signed in successfully");

        let mut chat = Self {
            client,
            base_url,
            session: Arc::new(session),
            room_id: Arc::from(""),
            history_count: config.history_count,
        };
        chat.room_id = Arc::from(chat.find_channel(&config.channel).await?);
        info!(channel = %config.channel, room_id = %chat.room_id, "channel found");

        Ok(chat)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.client
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, self.session.auth_token.as_str())
            .header(USER_ID_HEADER, self.session.user_id.as_str())
    }

    async fn find_channel(&self, name: &str) -> RocketChatResult<String> {
        let response: ChannelsResponse =
            send_json(self.request(Method::GET, CHANNELS_PATH), CHANNELS_PATH).await?;
        response
            .channels
            .into_iter()
            .find(|channel| channel.name == name)
            .map(|channel| channel.id)
            .ok_or_else(|| RocketChatError::ChannelNotFound {
                channel: name.to_string(),
            })
    }

    async fn post_message(&self, text: &str) -> RocketChatResult<OffsetDateTime> {
        let body = PostMessageRequest {
            room_id: &self.room_id,
            text,
        };
        let response: PostMessageResponse = send_json(
            self.request(Method::POST, POST_MESSAGE_PATH).json(&body),
            POST_MESSAGE_PATH,
        )
        .await?;

        if !response.success {
            return Err(RocketChatError::PostRejected);
        }
        Ok(response
            .message
            .and_then(|message| message.ts)
            .and_then(|ts| ts.parse())
            .unwrap_or_else(OffsetDateTime::now_utc))
    }

    async fn history(&self, since: OffsetDateTime) -> RocketChatResult<Vec<ChatMessage>> {
        let oldest = since
            .format(&Rfc3339)
            .map_err(|source| RocketChatError::FormatTimestamp { source })?;
        let query = [
            ("roomId", self.room_id.to_string()),
            ("oldest", oldest),
            ("count", self.history_count.to_string()),
        ];

        let response: HistoryResponse = send_json(
            self.request(Method::GET, HISTORY_PATH).query(&query),
            HISTORY_PATH,
        )
        .await?;

        if response.is_full(self.history_count) {
            warn!(
                count = self.history_count,
                "history page is full; older messages since the last poll may be skipped"
            );
        }
        Ok(response.into_messages())
    }
}

impl ChatTransport for RocketChatClient {
    fn current_user_id(&self) -> &str {
        &self.session.user_id
    }

    fn post(&self, text: String) -> BoxFuture<'static, TransportResult<OffsetDateTime>> {
        let chat = self.clone();
        Box::pin(async move { chat.post_message(&text).await.map_err(Into::into) })
    }

    fn fetch_since(
        &self,
        since: OffsetDateTime,
    ) -> BoxFuture<'static, TransportResult<Vec<ChatMessage>>> {
        let chat = self.clone();
        Box::pin(async move { chat.history(since).await.map_err(Into::into) })
    }
}

async fn login(
    client: &Client,
    base_url: &str,
    user: &str,
    password: &str,
) -> RocketChatResult<Session> {
    let url = format!("{base_url}/{LOGIN_PATH}");
    let request = client.post(url).json(&LoginRequest { user, password });
    let response = request
        .send()
        .await
        .map_err(|source| RocketChatError::RequestSend {
            path: LOGIN_PATH.to_string(),
            source,
        })?;

    // A rejected login answers 401 with a JSON body carrying the status.
    let payload = response
        .json::<LoginResponse>()
        .await
        .map_err(|source| RocketChatError::DecodeResponse {
            path: LOGIN_PATH.to_string(),
            source,
        })?;
    let status = payload.status.clone();
    payload
        .into_session()
        .ok_or(RocketChatError::LoginRejected { status })
}

async fn send_json<T>(builder: RequestBuilder, path: &str) -> RocketChatResult<T>
where
    T: DeserializeOwned,
{
    let response = builder
        .send()
        .await
        .map_err(|source| RocketChatError::RequestSend {
            path: path.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(RocketChatError::RequestStatus {
            path: path.to_string(),
            status: response.status(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|source| RocketChatError::DecodeResponse {
            path: path.to_string(),
            source,
        })
}
