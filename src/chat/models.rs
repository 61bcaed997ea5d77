use time::OffsetDateTime;

/// A channel message, validated at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Server-side message identifier.
    pub id: String,
    /// Identifier of the author.
    pub author_id: String,
    /// Display name of the author.
    pub author_name: String,
    /// Raw message text.
    pub text: String,
    /// Server timestamp of the message.
    pub timestamp: OffsetDateTime,
}

/// Authenticated session returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Token sent with every request.
    pub auth_token: String,
    /// Identifier of the bot user.
    pub user_id: String,
}
