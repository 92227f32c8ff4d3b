use thiserror::Error;

#[derive(Error, Debug)]
pub enum RspError {
    #[error("Invalid window: width {width} and slide {slide} must both be positive")]
    InvalidWindow { width: i64, slide: i64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Query error: {0}")]
    Query(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    #[error("Window not found: {0}")]
    WindowNotFound(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl RspError {
    pub fn query<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        RspError::Query(err.into())
    }
}

pub type Result<T> = std::result::Result<T, RspError>;
