use thiserror::Error;

//typed errors so the collector can log the failure class

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid device url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    #[error("failed to decode {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
}
