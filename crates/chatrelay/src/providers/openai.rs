use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use super::base::{CompletionRequest, Provider, StreamEvent, TokenStream};
use super::configs::BackendConfig;
use super::utils::{decode_line, Frame, LineBuffer, MAX_LINE_BYTES};
use crate::errors::{RelayError, RelayResult};
use crate::pool::Endpoint;

/// Relays streaming replies from OpenAI-compatible chat completion servers
/// (llama.cpp, vLLM and friends).
pub struct OpenAiProvider {
    client: Client,
    config: BackendConfig,
}

impl OpenAiProvider {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, endpoint: &Endpoint, request: &CompletionRequest) -> RelayResult<Response> {
        let mut builder = self.client.post(endpoint.as_str()).json(request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RelayError::BackendUnavailable {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        info!("Backend {} responded with {}", endpoint, status);

        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            error!("Backend {} rejected the request: {}", endpoint, body);
            return Err(RelayError::BackendRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn stream(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> RelayResult<TokenStream> {
        debug!(
            "Sending to {}: {}",
            endpoint,
            serde_json::to_string_pretty(request).unwrap_or_default()
        );

        let response = self.post(endpoint, request).await?;

        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(relay_frames(response, tx, endpoint.clone()));

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Read the backend reply line by line and push tokens to `tx`.
///
/// Returns on the terminal sentinel, end of body, a read error, an oversized
/// line, or as soon as the receiving side is dropped. Returning drops the response body, which
/// closes the backend connection.
async fn relay_frames(response: Response, tx: mpsc::Sender<StreamEvent>, endpoint: Endpoint) {
    let mut body = response.bytes_stream();
    let mut lines = LineBuffer::new();

    loop {
        let chunk = tokio::select! {
            _ = tx.closed() => {
                debug!("Caller disconnected, closing stream from {}", endpoint);
                return;
            }
            chunk = body.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                for line in lines.push(&bytes) {
                    if forward(&line, &tx).await.is_break() {
                        return;
                    }
                }
                if lines.pending_len() > MAX_LINE_BYTES {
                    error!("Stream from {} sent an oversized line", endpoint);
                    let _ = tx
                        .send(StreamEvent::Error(format!(
                            "Backend sent a line longer than {} bytes",
                            MAX_LINE_BYTES
                        )))
                        .await;
                    return;
                }
            }
            Some(Err(e)) => {
                error!("Stream from {} was interrupted: {}", endpoint, e);
                let _ = tx
                    .send(StreamEvent::Error(format!("Backend stream interrupted: {}", e)))
                    .await;
                return;
            }
            None => {
                if let Some(line) = lines.finish() {
                    let _ = forward(&line, &tx).await;
                }
                debug!("Stream from {} ended without terminal sentinel", endpoint);
                return;
            }
        }
    }
}

async fn forward(line: &str, tx: &mpsc::Sender<StreamEvent>) -> ControlFlow<()> {
    match decode_line(line) {
        Frame::Token(text) => {
            if tx.send(StreamEvent::Token(text)).await.is_err() {
                return ControlFlow::Break(());
            }
        }
        Frame::Done => return ControlFlow::Break(()),
        Frame::Malformed(reason) => warn!("Skipping malformed frame ({}): {}", reason, line),
        Frame::Skip => {}
    }
    ControlFlow::Continue(())
}
