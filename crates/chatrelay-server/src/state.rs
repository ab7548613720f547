use anyhow::Result;
use chatrelay::conversation::ConversationBuilder;
use chatrelay::dispatch::Dispatcher;
use chatrelay::pool::{Endpoint, ServerPool};
use chatrelay::providers::configs::BackendConfig;
use chatrelay::providers::openai::OpenAiProvider;
use chatrelay::web::metadata::{MetadataConfig, MetadataFetcher};
use std::sync::Arc;
use std::time::Duration;

use crate::configuration::Settings;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn from_settings(settings: Settings) -> Result<Self> {
        let pool = ServerPool::new(
            settings
                .backend
                .endpoints
                .into_iter()
                .filter(|url| !url.trim().is_empty())
                .map(Endpoint::new)
                .collect(),
        )?;

        let provider = OpenAiProvider::new(BackendConfig {
            api_key: settings.backend.api_key,
            timeout: Duration::from_secs(settings.backend.timeout_secs),
            ..Default::default()
        })?;

        let mut builder = ConversationBuilder::new(settings.presets)
            .with_assistant_name(settings.prompt.assistant_name);
        if let Some(template) = settings.prompt.system_template {
            builder = builder.with_system_template(template);
        }

        let mut dispatcher = Dispatcher::new(pool, Arc::new(provider), builder)
            .with_default_model(settings.backend.model);

        if let Some(url) = settings.metadata.url {
            let fetcher = MetadataFetcher::new(MetadataConfig {
                url,
                api_key: settings.metadata.api_key,
                timeout: Duration::from_secs(settings.metadata.timeout_secs),
            })?;
            dispatcher = dispatcher.with_metadata_fetcher(fetcher);
        }

        Ok(Self::new(dispatcher))
    }
}
