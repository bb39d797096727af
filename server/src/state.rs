use crate::config::Config;
use crate::error::ApiError;
use crate::upstream::UpstreamClient;

pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::from_config(&config)?;
        Ok(Self { config, upstream })
    }

    /// Upstream credential, or a configuration error when it is unset.
    pub fn api_key(&self) -> Result<&str, ApiError> {
        self.config
            .gemini_api_key
            .as_deref()
            .ok_or_else(|| {
                ApiError::Configuration(
                    "GEMINI_API_KEY is missing from environment variables".to_string(),
                )
            })
    }
}
