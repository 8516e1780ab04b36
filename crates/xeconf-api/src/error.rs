use thiserror::Error;

use xeconf_core::StoreError;

/// Top-level error type for the `xeconf-api` crate.
///
/// Covers transport and device-side failures of the RESTCONF client.
/// The reconciler never sees these directly -- they are mapped into
/// `xeconf_core::StoreError` at the `RemoteStore` boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Credentials rejected by the device.
    #[error("Authentication failed (HTTP {status})")]
    Authentication { status: u16 },

    /// The target data resource does not exist.
    #[error("Data resource not found")]
    NotFound,

    /// Any other non-success status, with the RESTCONF errors body when
    /// the device sent one.
    #[error("Device rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The response body was not valid yang-data JSON.
    #[error("Malformed response body: {message}")]
    MalformedBody { message: String },
}

impl Error {
    /// Map an unsuccessful response status to the matching error.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Authentication {
                status: status.as_u16(),
            },
            404 => Self::NotFound,
            code => Self::Rejected { status: code, body },
        }
    }
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound => Self::NotFound,
            Error::Authentication { status } => Self::Rejected {
                status: Some(status),
                message: err.to_string(),
            },
            Error::Rejected { status, body } => Self::Rejected {
                status: Some(status),
                message: body,
            },
            Error::Transport(_) | Error::InvalidUrl(_) | Error::Tls(_) => Self::Transport {
                message: err.to_string(),
            },
            Error::MalformedBody { message } => Self::Transport { message },
        }
    }
}
