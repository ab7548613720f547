use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::errors::RelayResult;
use crate::models::message::Message;
use crate::pool::Endpoint;

/// Body of a streaming chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn streaming<S: Into<String>>(model: S, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }
}

/// One item of a relayed reply.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental assistant text, in the order the backend produced it
    Token(String),
    /// The backend failed after streaming began; nothing follows this
    Error(String),
}

pub type TokenStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// A completion server reachable at pool endpoints.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send `request` to `endpoint` and return its reply as a token stream.
    ///
    /// Fails only when no token could be produced at all (the backend rejected
    /// the request or could not be reached). Dropping the stream stops reading
    /// from the backend.
    async fn stream(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> RelayResult<TokenStream>;
}
