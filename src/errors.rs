use crate::version::{
    ApiVersion,
    VersionRange,
};
use thiserror::Error;

/// `InspectrsError` is the error type returned from all inspectrs operations.
#[derive(Debug, Error)]
pub enum InspectrsError {
    /// The requested API version falls outside of the range the server advertises.
    #[error(
        "version {requested} is not supported by the server, supported range is {supported}"
    )]
    VersionMismatch {
        /// The version that was requested.
        requested: ApiVersion,
        /// The range the server actually supports.
        supported: VersionRange,
    },

    /// A network/connection level failure reaching the service.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A non-2xx response from the server, carrying the status code and the server provided
    /// message.
    #[error("server returned error \"{message}\" (HTTP {status})")]
    Http {
        /// The HTTP status code of the response.
        status: u16,
        /// The error message extracted from the response body.
        message: String,
    },

    /// A node or rule identifier that the server could not resolve.
    #[error("{message} (HTTP 404)")]
    NotFound {
        /// The error message extracted from the response body.
        message: String,
    },

    /// Malformed input -- a bad version string, a rule that is not a list of objects, an unknown
    /// interface field and the like.
    #[error("validation error: {0}")]
    Validation(String),

    /// A response (or rule file) body that could not be decoded as JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Timeout while waiting for nodes to finish introspection.
    #[error("timeout while waiting for introspection of nodes {pending:?}")]
    WaitTimeout {
        /// Identifiers of the nodes that had not finished when the wait gave up.
        pending: Vec<String>,
    },

    /// One or more nodes finished introspection with an error while `--check-errors` was set.
    #[error("introspection failed for the following nodes: {nodes:?}")]
    IntrospectionFailed {
        /// Identifiers of the nodes whose final status carried an error.
        nodes: Vec<String>,
    },

    /// A local filesystem failure -- reading a rule file or writing saved introspection data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
