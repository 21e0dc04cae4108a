use std::time::Duration;

/// Build the shared upstream HTTP client.
pub fn build_http_client(timeout_secs: u64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(timeout_secs.max(5)))
        .tcp_nodelay(true)
        .build()
}
