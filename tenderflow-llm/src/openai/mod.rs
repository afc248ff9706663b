//! OpenAI provider implementation of the model gateway.

pub mod client;
pub mod types;

pub use client::OpenAIGateway;
