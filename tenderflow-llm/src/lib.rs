//! # Tenderflow LLM gateway
//!
//! The single chokepoint the tenderflow pipeline uses to talk to a
//! generative model. Provides a provider-agnostic [`gateway::ModelGateway`]
//! trait, a normalized [`gateway::GatewayResponse`] envelope with best-effort
//! JSON extraction, and an OpenAI chat-completions implementation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tenderflow_llm::gateway::ModelGateway;
//! use tenderflow_llm::openai::OpenAIGateway;
//! use tenderflow_llm::types::{ChatMessage, ChatRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = OpenAIGateway::new("your-api-key")?;
//!     let response = gateway
//!         .complete(ChatRequest::new(vec![ChatMessage::user("Hello!")]))
//!         .await?;
//!     println!("Response: {}", response.content);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod gateway;
pub mod openai;
pub mod types;
