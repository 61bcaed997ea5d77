mod client;
mod error;
mod models;

pub use client::RocketChatClient;
pub use error::{RocketChatError, RocketChatResult};
