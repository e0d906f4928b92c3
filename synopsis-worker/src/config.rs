//! Worker configuration
//!
//! Every tunable is resolved once at start-up into [`Config`] and passed
//! down explicitly; nothing below `main` reads the environment.

use std::time::Duration;
use synopsis_core::domain::document::DEFAULT_OUTPUT_PREFIX;
use synopsis_core::domain::request::GenerationParams;

/// Worker configuration
#[derive(Clone)]
pub struct Config {
    /// Credential for the inference service
    pub api_key: String,

    /// Inference endpoint base URL (e.g., "https://api.example.com/v2/abc123")
    pub endpoint: String,

    /// Prefix under which summaries are written
    pub output_prefix: String,

    /// Bucket for summaries; the source bucket when unset
    pub output_bucket: Option<String>,

    /// Maximum number of status queries per job
    pub max_poll_attempts: u32,

    /// Wait before each status query
    pub poll_interval: Duration,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,

    /// Deadline for the whole run, if any
    pub run_timeout: Option<Duration>,

    /// Sampling parameters sent with every job
    pub generation: GenerationParams,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("output_prefix", &self.output_prefix)
            .field("output_bucket", &self.output_bucket)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("run_timeout", &self.run_timeout)
            .field("generation", &self.generation)
            .finish()
    }
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(api_key: String, endpoint: String) -> Self {
        Self {
            api_key,
            endpoint,
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            output_bucket: None,
            max_poll_attempts: 10,
            poll_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            run_timeout: None,
            generation: GenerationParams::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - INFERENCE_API_KEY (required)
    /// - INFERENCE_ENDPOINT (required)
    /// - OUTPUT_PREFIX (optional, default: "summaries")
    /// - OUTPUT_BUCKET (optional, default: the source bucket)
    /// - MAX_POLLING_ATTEMPTS (optional, default: 10)
    /// - POLLING_INTERVAL (optional, seconds, default: 5)
    /// - REQUEST_TIMEOUT (optional, seconds, default: 30)
    /// - RUN_TIMEOUT (optional, seconds, default: none)
    /// - MAX_TOKENS, TEMPERATURE, TOP_P (optional, default: 6000, 0.5, 0.9)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("INFERENCE_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("INFERENCE_API_KEY environment variable not set"))?;

        let endpoint = lookup("INFERENCE_ENDPOINT")
            .ok_or_else(|| anyhow::anyhow!("INFERENCE_ENDPOINT environment variable not set"))?;

        let mut config = Self::new(api_key, endpoint);

        if let Some(prefix) = lookup("OUTPUT_PREFIX") {
            config.output_prefix = prefix;
        }
        config.output_bucket = lookup("OUTPUT_BUCKET").filter(|b| !b.is_empty());

        if let Some(attempts) = parse_var::<u32, _>(&lookup, "MAX_POLLING_ATTEMPTS")? {
            config.max_poll_attempts = attempts;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "POLLING_INTERVAL")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "REQUEST_TIMEOUT")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        config.run_timeout = parse_var::<u64, _>(&lookup, "RUN_TIMEOUT")?.map(Duration::from_secs);

        if let Some(max_tokens) = parse_var(&lookup, "MAX_TOKENS")? {
            config.generation.max_tokens = max_tokens;
        }
        if let Some(temperature) = parse_var(&lookup, "TEMPERATURE")? {
            config.generation.temperature = temperature;
        }
        if let Some(top_p) = parse_var(&lookup, "TOP_P")? {
            config.generation.top_p = top_p;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            anyhow::bail!("api_key cannot be empty");
        }

        if self.endpoint.is_empty() {
            anyhow::bail!("endpoint cannot be empty");
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            anyhow::bail!("endpoint must start with http:// or https://");
        }

        let prefix = self.output_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            anyhow::bail!("output_prefix cannot be empty");
        }

        if prefix
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            anyhow::bail!(
                "output_prefix must be a relative path without empty, '.' or '..' segments"
            );
        }

        if self.max_poll_attempts == 0 {
            anyhow::bail!("max_poll_attempts must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.generation.max_tokens == 0 {
            anyhow::bail!("max_tokens must be greater than 0");
        }

        if !(0.0..=1.0).contains(&self.generation.top_p) {
            anyhow::bail!("top_p must be between 0 and 1");
        }

        if !self.generation.temperature.is_finite() || self.generation.temperature < 0.0 {
            anyhow::bail!("temperature must be a non-negative number");
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", name, raw, e)),
    }
}
