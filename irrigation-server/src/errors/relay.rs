#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Relay loop is no longer running")]
    ChannelClosed,

    #[error("Invalid limits: {0}")]
    InvalidLimits(String),
}
