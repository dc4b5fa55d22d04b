use crate::errors::InspectrsError;
use crate::version::ApiVersion;
use core::time::Duration;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The default ironic inspector URL -- the standard port on the local host.
pub const DEFAULT_URL: &str = "http://127.0.0.1:5050";

/// The default time (in seconds) to use for the HTTP request timeout.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Request header carrying the negotiated API version.
pub const VERSION_HEADER: &str = "X-OpenStack-Ironic-Inspector-API-Version";

/// Response header carrying the minimum API version the server supports.
pub const MIN_VERSION_HEADER: &str = "X-OpenStack-Ironic-Inspector-API-Minimum-Version";

/// Response header carrying the maximum API version the server supports.
pub const MAX_VERSION_HEADER: &str = "X-OpenStack-Ironic-Inspector-API-Maximum-Version";

/// Request header carrying the bearer/token credential.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// An enum defining the HTTP methods the introspection API is consumed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP DELETE.
    Delete,
}

impl Method {
    /// The canonical (upper case) name of the method, for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// A single request against the introspection API, relative to the versioned base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// The HTTP method to use.
    pub method: Method,
    /// The path relative to the versioned base URL, ex: `/introspection/<node>`.
    pub path: String,
    /// Query parameters to append to the URL.
    pub query: Vec<(String, String)>,
    /// An optional JSON body.
    pub body: Option<Value>,
}

#[allow(clippy::return_self_not_must_use)]
#[allow(clippy::must_use_candidate)]
impl ApiRequest {
    /// Return a new instance of `ApiRequest` for the given method and relative path.
    #[must_use]
    pub fn new(
        method: Method,
        path: &str,
    ) -> Self {
        Self {
            method,
            path: path.to_owned(),
            query: vec![],
            body: None,
        }
    }

    /// Appends a query parameter to the request.
    pub fn query(
        mut self,
        name: &str,
        value: &str,
    ) -> Self {
        self.query.push((name.to_owned(), value.to_owned()));

        self
    }

    /// Sets the JSON body of the request.
    pub fn body(
        mut self,
        body: Value,
    ) -> Self {
        self.body = Some(body);

        self
    }
}

/// A raw response from the introspection API -- status code, response headers and body bytes. Any
/// interpretation (error raising, JSON decoding) is left to the caller.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// The HTTP status code of the response.
    pub status: u16,
    /// The response headers as (name, value) pairs.
    pub headers: Vec<(String, String)>,
    /// The raw response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Returns the value of the named response header, if present. Header names are matched
    /// case-insensitively per the HTTP convention.
    #[must_use]
    pub fn header(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the response body as JSON into the requested type.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError::Json` if the body is not valid JSON for the type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, InspectrsError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Extract the error message from an error response body. The server returns errors in a
    /// `{"error": {"message": ...}}` envelope; older servers returned the bare message, so the
    /// raw body text is the fallback.
    #[must_use]
    pub fn error_message(&self) -> String {
        let raw = String::from_utf8_lossy(&self.body).into_owned();

        serde_json::from_slice::<Value>(&self.body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or(raw)
    }
}

/// Transport is the trait all inspectrs transports must implement in order to be consumed by a
/// client. A transport performs a single HTTP round trip; it reports transport level failures as
/// errors and hands any HTTP status -- including error statuses -- back as a response.
pub trait Transport {
    /// Perform one request, attaching the given negotiated API version (when set) per the
    /// transport convention.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError::Transport` if the service could not be reached.
    fn perform(
        &self,
        request: &ApiRequest,
        api_version: Option<ApiVersion>,
    ) -> Result<ApiResponse, InspectrsError>;
}

/// A struct holding generic arguments that apply to all transport flavors.
pub struct TransportArgs {
    /// The base URL of the service, already carrying the `/v<MAJOR>` postfix.
    pub base_url: String,
    /// The bearer/token credential sent with each request (if applicable).
    pub auth_token: Option<String>,
    /// The timeout duration for each HTTP request.
    pub timeout: Duration,
}

impl TransportArgs {
    /// Return a new instance of `TransportArgs` -- would be just a default impl but we require
    /// the base URL be set, so we just have this method.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = ApiResponse {
            status: 200,
            headers: vec![(VERSION_HEADER.to_owned(), "1.5".to_owned())],
            body: vec![],
        };

        assert_eq!(
            Some("1.5"),
            response.header("x-openstack-ironic-inspector-api-version")
        );
        assert_eq!(None, response.header("x-no-such-header"));
    }

    #[test]
    fn error_message_prefers_envelope() {
        let response = ApiResponse {
            status: 400,
            headers: vec![],
            body: br#"{"error": {"message": "boom"}}"#.to_vec(),
        };

        assert_eq!("boom", response.error_message());
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        let response = ApiResponse {
            status: 500,
            headers: vec![],
            body: b"old style error".to_vec(),
        };

        assert_eq!("old style error", response.error_message());
    }
}
