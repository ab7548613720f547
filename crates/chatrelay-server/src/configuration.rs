use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use chatrelay::presets::InstructionPresets;
use chatrelay::providers::configs::DEFAULT_MODEL;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Config file read when `CHATRELAY_CONFIG` is not set. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "chatrelay.toml";

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("bad server address: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
pub struct BackendSettings {
    /// Full chat completion URLs, used in this order
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MetadataSettings {
    /// Link-reader service; web augmentation is off without it
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u64,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: default_metadata_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PromptSettings {
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    #[serde(default)]
    pub system_template: Option<String>,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            system_template: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub metadata: MetadataSettings,
    #[serde(default)]
    pub prompt: PromptSettings,
    #[serde(default)]
    pub presets: InstructionPresets,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var(format!("{}_CONFIG", ENV_PREFIX))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_and_validate(path)
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_and_validate(path.into())
    }

    fn load_and_validate(path: PathBuf) -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Backend defaults
            .set_default("backend.model", default_model())?
            .set_default("backend.timeout_secs", default_backend_timeout())?
            // Optional file layer
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("backend.endpoints")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        let settings = match result {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // "missing field `content`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .split('`')
                        .next()
                        .unwrap_or_default();
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    });
                } else if let config::ConfigError::NotFound(field) = &err {
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    });
                }
                return Err(ConfigError::Other(err));
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.endpoints.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::MissingEnvVar {
                env_var: to_env_var("backend.endpoints"),
            });
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    1338
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_backend_timeout() -> u64 {
    600
}

fn default_metadata_timeout() -> u64 {
    15
}

fn default_assistant_name() -> String {
    chatrelay::conversation::DEFAULT_ASSISTANT_NAME.to_string()
}
