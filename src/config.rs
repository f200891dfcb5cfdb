use std::{net::SocketAddr, str::FromStr, time::Duration};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 60;
pub const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub port: u16,
    pub backend_url: String,
    /// `None` means wait as long as the backend takes.
    pub backend_timeout: Option<Duration>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            backend_timeout: Some(Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS)),
        }
    }
}

impl ProxyConfig {
    /// Reads `PORT`, `GENERATION_BACKEND_URL` and `BACKEND_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = parse_or("PORT", lookup("PORT"), defaults.port);
        let backend_url = lookup("GENERATION_BACKEND_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.backend_url);
        let timeout_secs = parse_or("BACKEND_TIMEOUT_SECS", lookup("BACKEND_TIMEOUT_SECS"), DEFAULT_BACKEND_TIMEOUT_SECS);
        let backend_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
        Self { port, backend_url, backend_timeout }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn backend_endpoint(&self) -> String {
        endpoint(&self.backend_url)
    }
}

/// `base` + `/api/generate`, tolerating a trailing slash on `base`.
pub fn endpoint(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), GENERATE_PATH)
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!("⚠️ Ignoring invalid {}={:?}, using {}", key, v, default);
            default
        }),
    }
}
