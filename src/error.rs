use std::path::PathBuf;

/// Rejected wallet address. The only error that aborts a valuation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid wallet address {address:?}: expected 32 to 44 bytes, got {length}")]
pub struct InvalidAddressError {
    pub address: String,
    pub length: usize,
}

/// Failure talking to the node or the price service.
///
/// The aggregation engine never surfaces these; each one is downgraded to a
/// zeroed field and reported to the observer.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamFetchError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{service} response could not be decoded: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} JSON-RPC error {code}: {message}")]
    Rpc {
        service: &'static str,
        code: i64,
        message: String,
    },

    #[error("{service} response has neither result nor error")]
    MissingResult { service: &'static str },
}

impl UpstreamFetchError {
    pub fn service(&self) -> &'static str {
        match self {
            Self::Transport { service, .. }
            | Self::Status { service, .. }
            | Self::Decode { service, .. }
            | Self::Rpc { service, .. }
            | Self::MissingResult { service } => service,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

/// Allow-list could not be loaded. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Failed to read asset allow-list {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse asset allow-list {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
