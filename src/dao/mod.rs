/// Durable per-user scores.
pub mod scoreboard;
/// Topic discovery and question file parsing.
pub mod topics;
