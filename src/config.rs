use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

/// Engine configuration. Every detection threshold is a field with a default
/// taken from the reference tuning; none of them carry calibration evidence,
/// so all are overridable via environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub embed_model: String,
    pub chat_model: String,
    pub provider_timeout_secs: u64,

    /// Jaccard similarity at or above which a response counts as a duplicate.
    pub duplicate_threshold: f64,
    /// Latency below this (with a long response) is flagged as a possible paste.
    pub fast_response_secs: f64,
    pub slow_response_secs: f64,
    /// Max/min latency ratio in the window above which timing is inconsistent.
    pub timing_ratio_limit: f64,
    /// Rolling latency window size per session.
    pub timing_window: usize,
    pub min_response_chars: usize,

    /// Prior-duplicate count at which the session terminates.
    pub max_duplicates: usize,
    /// Combined per-response flag count at which the session terminates.
    pub max_flags: usize,
    /// Cumulative off-topic count at which the session terminates.
    pub max_off_topic: usize,

    /// Question budget before natural completion.
    pub max_questions: usize,
    /// Below this many answered responses the summary cannot recommend hiring.
    pub min_responses: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            embed_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o".to_string(),
            provider_timeout_secs: 30,
            duplicate_threshold: 0.85,
            fast_response_secs: 2.0,
            slow_response_secs: 300.0,
            timing_ratio_limit: 10.0,
            timing_window: 10,
            min_response_chars: 10,
            max_duplicates: 2,
            max_flags: 5,
            max_off_topic: 3,
            max_questions: 10,
            min_responses: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Config::default();

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            embed_model: get_env_or("EMBED_MODEL", defaults.embed_model)?,
            chat_model: get_env_or("CHAT_MODEL", defaults.chat_model)?,
            provider_timeout_secs: get_env_parse_or(
                "PROVIDER_TIMEOUT_SECS",
                defaults.provider_timeout_secs,
            )?,
            duplicate_threshold: get_env_parse_or(
                "DUPLICATE_THRESHOLD",
                defaults.duplicate_threshold,
            )?,
            fast_response_secs: get_env_parse_or("FAST_RESPONSE_SECS", defaults.fast_response_secs)?,
            slow_response_secs: get_env_parse_or("SLOW_RESPONSE_SECS", defaults.slow_response_secs)?,
            timing_ratio_limit: get_env_parse_or("TIMING_RATIO_LIMIT", defaults.timing_ratio_limit)?,
            timing_window: get_env_parse_or("TIMING_WINDOW", defaults.timing_window)?,
            min_response_chars: get_env_parse_or("MIN_RESPONSE_CHARS", defaults.min_response_chars)?,
            max_duplicates: get_env_parse_or("MAX_DUPLICATES", defaults.max_duplicates)?,
            max_flags: get_env_parse_or("MAX_FLAGS", defaults.max_flags)?,
            max_off_topic: get_env_parse_or("MAX_OFF_TOPIC", defaults.max_off_topic)?,
            max_questions: get_env_parse_or("MAX_QUESTIONS", defaults.max_questions)?,
            min_responses: get_env_parse_or("MIN_RESPONSES", defaults.min_responses)?,
        })
    }
}

fn get_env_or(name: &str, default: String) -> Result<String> {
    Ok(env::var(name).unwrap_or(default))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
