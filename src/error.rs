use thiserror::Error;

/// A name could not be found in the catalog reported by the device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("effect '{name}' not found on the WLED device")]
    Effect { name: String },
    #[error("palette '{name}' not found and fallback {fallback:?} unavailable")]
    Palette {
        name: String,
        fallback: Option<String>,
    },
}

/// Failure at the HTTP boundary: network, timeout, status or body decoding.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
    #[error("could not encode request body: {0}")]
    Encode(serde_json::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
