// External data providers: historical pitch data (Baseball Savant) and
// live games / standings (MLB StatsAPI).

pub mod live;
pub mod statcast;

use thiserror::Error;

/// Errors surfaced by either provider. Callers on non-fatal paths (the
/// validator's season lookup, the report binary) log these and degrade to a
/// default rather than propagating.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("response missing expected field `{0}`")]
    MissingField(&'static str),
}
