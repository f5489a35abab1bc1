use std::{env, str::FromStr, time::Duration};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.tomtom.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;
pub const DEFAULT_RECENT_CAPACITY: usize = 20;
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: \"{value}\"")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct NavConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub suggestion_limit: usize,
    pub recent_capacity: usize,
    pub requests_per_second: u32,
}

impl NavConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
        }
    }

    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, with the variable source injected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("TOMTOM_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("TOMTOM_API_KEY"))?;

        let mut config = NavConfig::new(api_key);
        if let Some(url) = lookup("TOMTOM_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "NAVASSIST_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = parse_var(&lookup, "NAVASSIST_SUGGESTION_LIMIT")? {
            config.suggestion_limit = limit;
        }
        if let Some(capacity) = parse_var(&lookup, "NAVASSIST_RECENT_CAPACITY")? {
            config.recent_capacity = capacity;
        }
        if let Some(rate) = parse_var(&lookup, "NAVASSIST_REQUESTS_PER_SECOND")? {
            config.requests_per_second = rate;
        }
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn api_key_is_required() {
        let err = NavConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TOMTOM_API_KEY")));

        let err = NavConfig::from_lookup(lookup_from(&[("TOMTOM_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = NavConfig::from_lookup(lookup_from(&[("TOMTOM_API_KEY", "k")])).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.suggestion_limit, 5);
        assert_eq!(config.recent_capacity, 20);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = NavConfig::from_lookup(lookup_from(&[
            ("TOMTOM_API_KEY", "k"),
            ("TOMTOM_BASE_URL", "http://localhost:8080/"),
            ("NAVASSIST_TIMEOUT_SECS", "3"),
            ("NAVASSIST_SUGGESTION_LIMIT", "8"),
            ("NAVASSIST_RECENT_CAPACITY", "4"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.suggestion_limit, 8);
        assert_eq!(config.recent_capacity, 4);
    }

    #[test]
    fn bad_numbers_are_reported_by_name() {
        let err = NavConfig::from_lookup(lookup_from(&[
            ("TOMTOM_API_KEY", "k"),
            ("NAVASSIST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        match err {
            ConfigError::Invalid { name, value } => {
                assert_eq!(name, "NAVASSIST_TIMEOUT_SECS");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
