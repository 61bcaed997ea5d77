/// Command dispatch for `!` prefixed messages.
pub mod command_service;
/// Core game logic: asking, answering, timeouts and pausing.
pub mod game_service;
/// Incremental channel polling with a monotonic checkpoint.
pub mod poller;
/// Ask/poll/sleep loop tying the game to a chat transport.
pub mod runner;
