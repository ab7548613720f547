use async_trait::async_trait;
use futures::stream;
use std::sync::{Arc, Mutex};

use crate::errors::{RelayError, RelayResult};
use crate::pool::Endpoint;
use crate::providers::base::{CompletionRequest, Provider, StreamEvent, TokenStream};

/// A mock provider that replays pre-configured tokens and records every call
pub struct MockProvider {
    tokens: Vec<String>,
    reject_with: Option<u16>,
    calls: Arc<Mutex<Vec<(Endpoint, CompletionRequest)>>>,
}

impl MockProvider {
    /// Create a mock provider that answers every request with `tokens`
    pub fn new(tokens: Vec<&str>) -> Self {
        Self {
            tokens: tokens.into_iter().map(String::from).collect(),
            reject_with: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider that rejects every request with `status`
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<(Endpoint, CompletionRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn stream(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> RelayResult<TokenStream> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.clone(), request.clone()));

        if let Some(status) = self.reject_with {
            return Err(RelayError::BackendRejected {
                status,
                body: "mock rejection".to_string(),
            });
        }

        let events: Vec<StreamEvent> = self.tokens.iter().cloned().map(StreamEvent::Token).collect();
        Ok(Box::pin(stream::iter(events)))
    }
}
