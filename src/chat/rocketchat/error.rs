//! Error types of the Rocket.Chat REST client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::chat::transport::TransportError;

/// Convenient result alias returning [`RocketChatError`] failures.
pub type RocketChatResult<T> = Result<T, RocketChatError>;

/// Failures that can occur while talking to Rocket.Chat.
#[derive(Debug, Error)]
pub enum RocketChatError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Rocket.Chat client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send Rocket.Chat request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Rocket.Chat returned an unexpected status code.
    #[error("unexpected Rocket.Chat response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode Rocket.Chat response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered the login without a session.
    #[error("Rocket.Chat login rejected (status `{status}`)")]
    LoginRejected { status: String },
    /// The bot is not a member of the configured channel.
    #[error("channel `#{channel}` not found; check it exists and the bot user is added to it")]
    ChannelNotFound { channel: String },
    /// The server did not confirm a posted message.
    #[error("Rocket.Chat did not accept the message")]
    PostRejected,
    /// A timestamp could not be rendered for a query.
    #[error("failed to format timestamp")]
    FormatTimestamp {
        #[source]
        source: time::error::Format,
    },
}

impl From<RocketChatError> for TransportError {
    fn from(err: RocketChatError) -> Self {
        TransportError::unavailable(err.to_string(), err)
    }
}
