#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid endpoint `{0}`: expected `http://host:port`, `host:port` or `unix:///path`")]
    InvalidEndpoint(String),
    #[error("failed to connect to `{endpoint}`: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("invalid target node `{target}`: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: tonic::metadata::errors::InvalidMetadataValue,
    },
    #[error("machine service is not ready: {0}")]
    NotReady(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("machine service call failed: {0}")]
    Rpc(#[source] Box<tonic::Status>),
}

pub type Result<T> = std::result::Result<T, Error>;
