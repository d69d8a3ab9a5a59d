//! HTTP client for the bill analysis service.
//!
//! Submits tagged text and hands back an [`AnalysisStream`] over the chunked
//! response. Also carries the manual copy-for-AI path: when automated
//! analysis is unavailable the same tagged text, prefixed with an
//! instructional preamble, can be pasted into any assistant.

use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::stream::AnalysisStream;

/// Instructional preamble prepended to tagged text for the manual path.
pub const COPY_PREAMBLE: &str = "\
You are reading legislative bill text that has been tagged to preserve \
legislative formatting:

- Text wrapped in [NEW] ... [/NEW] is NEW LANGUAGE being added to existing law
- Text wrapped in [DELETED] ... [/DELETED] is LANGUAGE BEING REMOVED from existing law
- All other text is EXISTING LAW that remains unchanged

Explain what substantive changes this bill makes: what is being removed, \
what is replacing it, and the practical impact. Be specific and reference \
the actual language.";

/// Analyses longer than this are likely to be cut off mid-answer.
pub const WORD_LIMIT: usize = 15_000;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis service returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("analysis stream failed: {0}")]
    Transport(String),
}

/// Boxed response byte stream; pinning keeps [`AnalysisStream`] `Unpin`.
pub type ResponseBytes = Pin<Box<dyn Stream<Item = Result<Bytes, AnalyzeError>> + Send>>;

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    #[serde(rename = "taggedText")]
    tagged_text: &'a str,
}

/// Client for the analysis service's streaming endpoint.
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// `base_url` should be like `http://localhost:8000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit tagged text for analysis and open the fragment stream.
    ///
    /// A non-success status surfaces here, before any fragment is delivered;
    /// the stream itself then fails at most once more, mid-delivery.
    pub async fn analyze(
        &self,
        tagged_text: &str,
    ) -> Result<AnalysisStream<ResponseBytes>, AnalyzeError> {
        let url = format!("{}/api/v1/bills/analyze", self.base_url);
        let (too_long, words) = check_length(tagged_text);
        info!(url = %url, words, too_long, "requesting bill analysis");

        let resp = self
            .client
            .post(&url)
            .json(&AnalyzeRequest { tagged_text })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalyzeError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes: ResponseBytes = Box::pin(resp.bytes_stream().map(|r| r.map_err(Into::into)));
        Ok(AnalysisStream::new(bytes))
    }
}

/// Whether the tagged text exceeds [`WORD_LIMIT`], with its word count.
pub fn check_length(tagged_text: &str) -> (bool, usize) {
    let words = tagged_text.split_whitespace().count();
    (words > WORD_LIMIT, words)
}

/// The tagged text prefixed with [`COPY_PREAMBLE`], ready to paste anywhere.
pub fn copy_for_ai(tagged_text: &str) -> String {
    format!("{COPY_PREAMBLE}\n\n{tagged_text}")
}
