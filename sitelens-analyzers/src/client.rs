use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = "SiteLens/0.1 (https://github.com/trapdoorsec/sitelens)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Shared HTTP client for every analyzer
pub fn http_client(timeout_secs: u64) -> Result<Client> {
    let timeout_secs = timeout_secs.max(1);
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

pub fn default_client() -> Result<Client> {
    http_client(DEFAULT_TIMEOUT_SECS)
}
