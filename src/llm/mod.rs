//! Model endpoint abstraction and the chat completions client.
//!
//! Agents talk to the model only through [`ModelEndpoint`], so tests can
//! substitute scripted endpoints and callers can plug in other providers.

mod client;
mod types;

pub use client::*;
pub use types::*;

use async_trait::async_trait;

use crate::error::EndpointResult;

/// A chat model that turns an ordered conversation into one assistant reply.
///
/// Implementations must not keep conversation state of their own; the
/// caller passes the full history on every call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelEndpoint: Send + Sync {
    /// Run one completion over `messages` and return the assistant text.
    async fn complete(
        &self,
        messages: &[Message],
        settings: &GenerationSettings,
    ) -> EndpointResult<String>;
}
