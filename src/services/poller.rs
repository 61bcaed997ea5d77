use time::OffsetDateTime;
use tracing::debug;

use crate::chat::{ChatTransport, models::ChatMessage, transport::TransportResult};

/// Fetches new channel messages and holds them until the game has processed them.
///
/// The fetch cursor moves past everything retrieved, while the checkpoint only moves past
/// messages handed back through [`MessagePoller::commit`].
#[derive(Debug, Clone)]
pub struct MessagePoller {
    checkpoint: OffsetDateTime,
    fetched_until: OffsetDateTime,
    pending: Vec<ChatMessage>,
    bot_user_id: String,
}

impl MessagePoller {
    /// Start polling after `checkpoint`, ignoring messages authored by `bot_user_id`.
    pub fn new(checkpoint: OffsetDateTime, bot_user_id: impl Into<String>) -> Self {
        Self {
            checkpoint,
            fetched_until: checkpoint,
            pending: Vec::new(),
            bot_user_id: bot_user_id.into(),
        }
    }

    /// Timestamp of the latest processed message.
    pub fn checkpoint(&self) -> OffsetDateTime {
        self.checkpoint
    }

    /// Player messages fetched but not processed yet, oldest first.
    pub fn pending(&self) -> &[ChatMessage] {
        &self.pending
    }

    /// Fetch messages posted since the last fetch and queue them behind the pending ones.
    ///
    /// Returns how many new player messages were queued. A failed fetch leaves the queue and the
    /// cursor untouched.
    pub async fn poll<T>(&mut self, transport: &T) -> TransportResult<usize>
    where
        T: ChatTransport + ?Sized,
    {
        let fetched = transport.fetch_since(self.fetched_until).await?;
        Ok(self.absorb(fetched))
    }

    /// Order a fetched page, advance the fetch cursor, drop the bot's own messages and queue
    /// the rest.
    pub fn absorb(&mut self, fetched: Vec<ChatMessage>) -> usize {
        let mut messages: Vec<ChatMessage> = fetched
            .into_iter()
            .filter(|message| message.timestamp > self.fetched_until)
            .collect();
        messages.sort_by_key(|message| message.timestamp);

        if let Some(latest) = messages.last() {
            self.fetched_until = latest.timestamp;
        }

        messages.retain(|message| message.author_id != self.bot_user_id);
        let queued = messages.len();
        if queued > 0 {
            debug!(count = queued, pending = self.pending.len(), "new messages");
        }
        self.pending.extend(messages);
        queued
    }

    /// Drop the first `consumed` pending messages and move the checkpoint past them.
    pub fn commit(&mut self, consumed: usize) {
        let consumed = consumed.min(self.pending.len());
        if let Some(last) = self.pending.drain(..consumed).last() {
            self.checkpoint = self.checkpoint.max(last.timestamp);
        }
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;

    fn at(base: OffsetDateTime, secs: i64, author: &str, text: &str) -> ChatMessage {
        ChatMessage {
            id: format!("{author}-{secs}"),
            author_id: author.to_string(),
            author_name: author.to_string(),
            text: text.to_string(),
            timestamp: base + Duration::seconds(secs),
        }
    }

    fn base() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::days(20_000)
    }

    fn texts(poller: &MessagePoller) -> Vec<&str> {
        poller.pending().iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn absorb_orders_and_filters_own_messages() {
        let base = base();
        let mut poller = MessagePoller::new(base, "bot");

        let queued = poller.absorb(vec![
            at(base, 3, "bob", "second"),
            at(base, 1, "alice", "first"),
            at(base, 4, "bot", "What is 2+2?"),
        ]);

        assert_eq!(queued, 2);
        assert_eq!(texts(&poller), vec!["first", "second"]);
        assert_eq!(poller.checkpoint(), base);
    }

    #[test]
    fn absorb_skips_already_fetched_messages() {
        let base = base();
        let mut poller = MessagePoller::new(base + Duration::seconds(5), "bot");

        poller.absorb(vec![
            at(base, 2, "alice", "old"),
            at(base, 5, "alice", "same instant"),
            at(base, 6, "alice", "new"),
        ]);
        assert_eq!(texts(&poller), vec!["new"]);

        poller.absorb(vec![at(base, 6, "alice", "new"), at(base, 7, "bob", "newer")]);
        assert_eq!(texts(&poller), vec!["new", "newer"]);
    }

    #[test]
    fn checkpoint_follows_processed_messages_only() {
        let base = base();
        let mut poller = MessagePoller::new(base, "bot");
        poller.absorb(vec![
            at(base, 1, "alice", "paris"),
            at(base, 2, "bob", "!commands"),
        ]);

        poller.commit(1);
        assert_eq!(poller.checkpoint(), base + Duration::seconds(1));
        assert_eq!(texts(&poller), vec!["!commands"]);

        poller.absorb(vec![at(base, 3, "carol", "!score")]);
        assert_eq!(texts(&poller), vec!["!commands", "!score"]);

        poller.commit(5);
        assert!(poller.pending().is_empty());
        assert_eq!(poller.checkpoint(), base + Duration::seconds(3));
    }

    #[test]
    fn empty_page_keeps_checkpoint() {
        let base = base();
        let mut poller = MessagePoller::new(base, "bot");

        assert_eq!(poller.absorb(Vec::new()), 0);
        poller.commit(0);
        assert_eq!(poller.checkpoint(), base);
    }
}
