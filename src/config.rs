//! Service configuration resolved from the environment once at startup.

use std::time::Duration;

pub const ENV_BACKEND_ENDPOINT: &str = "IMGCONV_BACKEND_ENDPOINT";
pub const ENV_API_URL: &str = "IMGCONV_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "IMGCONV_TIMEOUT_SECS";
pub const ENV_PROGRESS_START: &str = "IMGCONV_PROGRESS_START";
pub const ENV_PROGRESS_END: &str = "IMGCONV_PROGRESS_END";
pub const ENV_PROGRESS_DURATION_MS: &str = "IMGCONV_PROGRESS_DURATION_MS";
pub const ENV_PROGRESS_TICK_MS: &str = "IMGCONV_PROGRESS_TICK_MS";
/// Overrides the settings file location; read by the binaries.
pub const ENV_SETTINGS_PATH: &str = "IMGCONV_SETTINGS_PATH";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Timing of the cosmetic progress animation shown while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    pub start: u8,
    pub end: u8,
    pub duration: Duration,
    pub tick: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            start: 25,
            end: 90,
            duration: Duration::from_millis(3000),
            tick: Duration::from_millis(100),
        }
    }
}

/// Where and how the conversion service is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Backend endpoint or reverse-proxy prefix; endpoints append `/v1/...`.
    pub base_url: String,
    pub timeout: Duration,
    pub animation: AnimationConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            animation: AnimationConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// The backend endpoint wins over the API prefix; empty values count as unset.
    /// Unparsable numbers fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let base_url = get(ENV_BACKEND_ENDPOINT)
            .or_else(|| get(ENV_API_URL))
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let timeout = parse_or(get(ENV_TIMEOUT_SECS), DEFAULT_TIMEOUT_SECS);

        let anim = defaults.animation;
        let start = parse_or(get(ENV_PROGRESS_START), anim.start).min(100);
        let end = parse_or(get(ENV_PROGRESS_END), anim.end).clamp(start, 100);
        let duration = parse_or(get(ENV_PROGRESS_DURATION_MS), anim.duration.as_millis() as u64);
        let tick = parse_or(get(ENV_PROGRESS_TICK_MS), anim.tick.as_millis() as u64).max(1);

        log::debug!("Resolved service base URL: {}", base_url);

        Self {
            base_url,
            timeout: Duration::from_secs(timeout),
            animation: AnimationConfig {
                start,
                end,
                duration: Duration::from_millis(duration),
                tick: Duration::from_millis(tick),
            },
        }
    }

    pub fn convert_url(&self) -> String {
        format!("{}/v1/convert", self.base_url)
    }

    pub fn formats_url(&self) -> String {
        format!("{}/v1/formats", self.base_url)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
