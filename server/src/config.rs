use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

#[derive(Clone)]
pub struct Config {
    /// Port the proxy listens on
    pub port: u16,
    /// Credential for the upstream model. Requests fail with 500 while unset.
    pub gemini_api_key: Option<String>,
    /// Base URL of the upstream `generateContent` API, without trailing slash
    pub gemini_base_url: String,
    /// Model name used in the upstream path
    pub gemini_model: String,
    /// Per-call timeout for the upstream model
    pub upstream_timeout: Duration,
    /// Directory holding the browser page, served at `/` when set
    pub static_dir: Option<String>,
    /// Origins allowed by CORS. Empty means same-origin only.
    pub allowed_origins: Vec<String>,
}

// Hand-written so the credential never reaches a log line.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("static_dir", &self.static_dir)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env_parse("PORT", 3000)?,
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_base_url: env_str("GEMINI_API_BASE_URL", DEFAULT_GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            gemini_model: env_str("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            upstream_timeout: Duration::from_secs(env_parse("UPSTREAM_TIMEOUT_SECS", 120)?),
            static_dir: env_opt("STATIC_DIR"),
            allowed_origins: env_csv("ALLOWED_ORIGINS", &["http://localhost:3000"]),
        })
    }

    /// Config pointing at an arbitrary upstream, used by tests and local fakes.
    pub fn for_upstream(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            port: 0,
            gemini_api_key: api_key,
            gemini_base_url: base_url.into().trim_end_matches('/').to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            upstream_timeout: Duration::from_secs(10),
            static_dir: None,
            allowed_origins: Vec::new(),
        }
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}

fn env_csv(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Err(_) => default.iter().map(|s| (*s).to_string()).collect(),
    }
}
