/// Chat command parsing.
pub mod command;
/// Outgoing chat notices.
pub mod notice;
