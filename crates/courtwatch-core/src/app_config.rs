use std::path::PathBuf;

/// Process-level settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub log_level: String,
    /// `None` leaves the HTTP client's default in place.
    pub request_timeout_secs: Option<u64>,
    pub user_agent: String,
    pub max_concurrent_requests: usize,
}
