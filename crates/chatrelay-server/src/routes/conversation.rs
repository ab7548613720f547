use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use chatrelay::{
    dispatch::ChatRequest,
    errors::RelayError,
    models::message::Message,
    providers::base::{StreamEvent, TokenStream},
};
use futures::Stream;
use serde::Deserialize;
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use tracing::{debug, info};

// Types matching the incoming JSON structure
#[derive(Debug, Deserialize)]
struct ConversationRequest {
    #[serde(default = "default_jailbreak")]
    jailbreak: String,
    #[serde(default)]
    model: Option<String>,
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct Meta {
    content: MetaContent,
}

#[derive(Debug, Deserialize)]
struct MetaContent {
    conversation: Vec<Message>,
    parts: Vec<Message>,
    internet_access: bool,
}

fn default_jailbreak() -> String {
    "default".to_string()
}

impl TryFrom<ConversationRequest> for ChatRequest {
    type Error = RelayError;

    fn try_from(request: ConversationRequest) -> Result<Self, Self::Error> {
        let content = request.meta.content;
        // Only the first part is the prompt
        let prompt = content.parts.into_iter().next().ok_or_else(|| {
            RelayError::RequestMalformed("`meta.content.parts` must not be empty".to_string())
        })?;

        Ok(ChatRequest {
            preset: request.jailbreak,
            model: request.model,
            conversation: content.conversation,
            prompt,
            internet_access: content.internet_access,
        })
    }
}

// Server-sent events carrying one token each
pub struct SseResponse {
    events: TokenStream,
    finished: bool,
}

impl SseResponse {
    fn new(events: TokenStream) -> Self {
        Self {
            events,
            finished: false,
        }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        loop {
            match self.events.as_mut().poll_next(cx) {
                Poll::Ready(Some(StreamEvent::Token(text))) => {
                    if text.is_empty() {
                        continue;
                    }
                    return Poll::Ready(Some(Ok(Bytes::from(ProtocolFormatter::format_token(
                        &text,
                    )))));
                }
                Poll::Ready(Some(StreamEvent::Error(message))) => {
                    self.finished = true;
                    return Poll::Ready(Some(Ok(Bytes::from(ProtocolFormatter::format_error(
                        &message,
                    )))));
                }
                Poll::Ready(None) => {
                    self.finished = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        let body = Body::from_stream(self);

        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            body,
        )
            .into_response()
    }
}

// Event stream framing
struct ProtocolFormatter;

impl ProtocolFormatter {
    fn format_token(text: &str) -> String {
        format!("{}\n", Self::data_lines(text))
    }

    fn format_error(message: &str) -> String {
        format!("event: error\n{}\n", Self::data_lines(message))
    }

    // One `data:` line per text line so receivers rejoin them with '\n'.
    // A lone '\r' ends an event-stream line too.
    fn data_lines(text: &str) -> String {
        text.replace("\r\n", "\n")
            .replace('\r', "\n")
            .split('\n')
            .map(|line| format!("data: {}\n", line))
            .collect()
    }
}

async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<SseResponse, ApiError> {
    let Json(request) = payload.map_err(|e| RelayError::RequestMalformed(e.body_text()))?;
    let request = ChatRequest::try_from(request)?;

    info!(
        "Conversation request: preset={}, internet_access={}, history={}",
        request.preset,
        request.internet_access,
        request.conversation.len()
    );
    debug!("Prompt: {}", request.prompt.content);

    let events = state.dispatcher.dispatch(request).await?;
    Ok(SseResponse::new(events))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/backend-api/v2/conversation", post(handler))
        .with_state(state)
}
