//! HTTP client for fetching bill markup from ILGA.gov.
//!
//! Fetching server-side keeps the parsing core free of CORS concerns; the
//! core consumes whatever markup string this returns.

use std::time::Duration;

use thiserror::Error;
use tracing::info;

/// Bill pages respond slowly; anything shorter times out real fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// ILGA serves an empty shell page to some clients; anything under this is
/// not a bill.
const MIN_BODY_LEN: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL, expected an ILGA.gov bill URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("retrieved content appears to be empty or invalid")]
    EmptyBody,
}

/// Client for fetching bill HTML by URL.
pub struct FetchClient {
    client: reqwest::Client,
}

impl FetchClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .expect("HTTP client initialisation"),
        }
    }

    /// Fetch the raw markup of a bill page.
    ///
    /// Only ILGA.gov URLs are accepted; non-success statuses and bodies too
    /// short to be a bill page are errors.
    pub async fn fetch_bill_html(&self, url: &str) -> Result<String, FetchError> {
        if !is_bill_url(url) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        info!(url = %url, "fetching bill markup");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        if body.len() < MIN_BODY_LEN {
            return Err(FetchError::EmptyBody);
        }
        info!(bytes = body.len(), "fetched bill markup");
        Ok(body)
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

fn is_bill_url(url: &str) -> bool {
    !url.is_empty() && url.to_ascii_lowercase().contains("ilga.gov")
}
