//! Chat transport abstraction and its Rocket.Chat implementation.

pub mod models;
#[cfg(feature = "rocket-chat")]
pub mod rocketchat;
pub mod transport;

use futures::future::BoxFuture;
use time::OffsetDateTime;

use self::{models::ChatMessage, transport::TransportResult};

/// Abstraction over the chat server the game is played on.
pub trait ChatTransport: Send + Sync {
    /// Identifier of the bot account, used to ignore its own messages.
    fn current_user_id(&self) -> &str;
    /// Post `text` to the game channel, returning the server timestamp of the new message.
    fn post(&self, text: String) -> BoxFuture<'static, TransportResult<OffsetDateTime>>;
    /// Fetch channel messages newer than `since`, in any order.
    fn fetch_since(
        &self,
        since: OffsetDateTime,
    ) -> BoxFuture<'static, TransportResult<Vec<ChatMessage>>>;
}
