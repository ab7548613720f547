use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::conversation::ConversationBuilder;
use crate::errors::RelayResult;
use crate::models::message::Message;
use crate::pool::ServerPool;
use crate::presets::InstructionPresets;
use crate::providers::base::{CompletionRequest, Provider, TokenStream};
use crate::providers::configs::DEFAULT_MODEL;
use crate::web::metadata::MetadataFetcher;
use crate::web::{extract_web_content, EXTRACTED_CONTENT_LABEL};

/// One inbound conversation turn, already parsed.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Instruction preset key
    pub preset: String,
    /// Falls back to the dispatcher's default model
    pub model: Option<String>,
    pub conversation: Vec<Message>,
    pub prompt: Message,
    pub internet_access: bool,
}

/// Runs the whole pipeline for a request: augment, build, pick a backend,
/// start the relay.
pub struct Dispatcher {
    pool: ServerPool,
    provider: Arc<dyn Provider>,
    builder: ConversationBuilder,
    fetcher: Option<MetadataFetcher>,
    default_model: String,
}

impl Dispatcher {
    pub fn new(pool: ServerPool, provider: Arc<dyn Provider>, builder: ConversationBuilder) -> Self {
        Self {
            pool,
            provider,
            builder,
            fetcher: None,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_metadata_fetcher(mut self, fetcher: MetadataFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_default_model<S: Into<String>>(mut self, model: S) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn pool(&self) -> &ServerPool {
        &self.pool
    }

    pub fn presets(&self) -> &InstructionPresets {
        self.builder.presets()
    }

    pub async fn dispatch(&self, request: ChatRequest) -> RelayResult<TokenStream> {
        self.dispatch_on(request, Local::now().date_naive()).await
    }

    /// Same as [`Dispatcher::dispatch`] with an explicit current date.
    pub async fn dispatch_on(&self, request: ChatRequest, date: NaiveDate) -> RelayResult<TokenStream> {
        let prompt = if request.internet_access {
            self.augment(request.prompt).await
        } else {
            request.prompt
        };

        if !self.presets().contains(&request.preset) {
            debug!("No preset named '{}', sending no extra instructions", request.preset);
        }

        let messages = self
            .builder
            .build(request.conversation, prompt, &request.preset, date)?;
        let model = request.model.unwrap_or_else(|| self.default_model.clone());
        let payload = CompletionRequest::streaming(model, messages);

        let endpoint = self.pool.next();
        info!("Dispatching to {}", endpoint);

        self.provider.stream(endpoint, &payload).await
    }

    /// Append extracted web content for any links in the prompt.
    pub async fn augment(&self, prompt: Message) -> Message {
        let Some(fetcher) = &self.fetcher else {
            warn!("Internet access requested but no metadata service is configured");
            return prompt;
        };

        debug!("Internet access query: {}", prompt.content);
        match extract_web_content(fetcher, &prompt.content).await {
            Some(block) => prompt.with_appendix(EXTRACTED_CONTENT_LABEL, &block),
            None => prompt,
        }
    }
}
