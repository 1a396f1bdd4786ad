use thiserror::Error;

/// Classified failure of a remote backend call. The gateway never retries;
/// retry policy belongs to the caller, which knows which calls are
/// idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("backend unreachable: {0}")]
    Network(String),
    #[error("backend request timed out")]
    Timeout,
    #[error("backend server error (status {0})")]
    Server(u16),
    #[error("backend rejected request (status {0})")]
    Client(u16),
    #[error("unexpected backend failure: {0}")]
    Unexpected(String),
}

impl GatewayError {
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        if status.is_server_error() {
            GatewayError::Server(status.as_u16())
        } else if status.is_client_error() {
            GatewayError::Client(status.as_u16())
        } else {
            GatewayError::Unexpected(format!("unexpected status {status}"))
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return GatewayError::Timeout;
        }
        if err.is_connect() {
            return GatewayError::Network(err.to_string());
        }
        if let Some(status) = err.status() {
            return GatewayError::from_status(status);
        }
        GatewayError::Unexpected(err.to_string())
    }
}
