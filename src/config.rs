use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://217.154.27.52:3000/api";

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub request_timeout: Duration,
    pub fetch_parallelism: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cache_ttl: Duration::from_secs(5 * 60),
            cache_capacity: 256,
            request_timeout: Duration::from_secs(10),
            fetch_parallelism: 6,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // NEXT_PUBLIC_API_URL is what the web dashboard deployments already export.
        let api_url = env::var("STATS_API_URL")
            .ok()
            .or_else(|| env::var("NEXT_PUBLIC_API_URL").ok())
            .and_then(|val| non_empty(&val).map(normalize_base_url))
            .unwrap_or(defaults.api_url);

        let cache_ttl = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);
        let cache_capacity = env::var("CACHE_CAPACITY")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.cache_capacity)
            .clamp(8, 4096);
        let request_timeout = Duration::from_secs(
            env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(defaults.request_timeout.as_secs())
                .clamp(1, 120),
        );
        let fetch_parallelism = env::var("FETCH_PARALLELISM")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.fetch_parallelism)
            .clamp(2, 32);
        let log_file = env::var("STATS_LOG_FILE")
            .ok()
            .and_then(|val| non_empty(&val).map(PathBuf::from));

        Self {
            api_url,
            cache_ttl,
            cache_capacity,
            request_timeout,
            fetch_parallelism,
            log_file,
        }
    }
}

pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slashes() {
        assert_eq!(
            normalize_base_url(" http://localhost:3000/api// "),
            "http://localhost:3000/api"
        );
    }

    #[test]
    fn defaults_match_dashboard_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }
}
