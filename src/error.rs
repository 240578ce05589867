//! Ways a feed request can fail.
//!
//! None of these reach the page: the fetcher collapses every variant into
//! `FeedResult::NoData`. They exist so the reason shows up in logs and tests.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed endpoint answered with status {0}")]
    Status(reqwest::StatusCode),

    /// The body is not JSON.
    #[error("feed body is not valid json: {0}")]
    Body(#[from] serde_json::Error),

    /// The body is JSON but not `{ "posts": [...] }`.
    #[error("feed body has the wrong shape: {0}")]
    Shape(&'static str),
}
