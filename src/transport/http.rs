use crate::errors::InspectrsError;
use crate::transport::base::{
    ApiRequest,
    ApiResponse,
    Method,
    Transport,
    TransportArgs,
    AUTH_TOKEN_HEADER,
    VERSION_HEADER,
};
use crate::version::ApiVersion;
use chrono::offset::Utc;
use log::debug;

/// `Http` is the standard inspectrs transport -- a thin wrapper around a blocking reqwest client
/// that attaches the auth token and negotiated version headers and hands raw responses back.
pub struct Http {
    /// The arguments the transport was created with.
    pub args: TransportArgs,
    client: reqwest::blocking::Client,
}

impl Http {
    /// Return a new instance of `Http` for the given transport args.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError::Transport` if the underlying HTTP client could not be
    /// constructed.
    pub fn new(args: TransportArgs) -> Result<Self, InspectrsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(args.timeout)
            .build()?;

        Ok(Self { args, client })
    }
}

impl Transport for Http {
    fn perform(
        &self,
        request: &ApiRequest,
        api_version: Option<ApiVersion>,
    ) -> Result<ApiResponse, InspectrsError> {
        let url = format!("{}{}", self.args.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(token) = self.args.auth_token.as_deref() {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }

        if let Some(version) = api_version {
            builder = builder.header(VERSION_HEADER, version.to_string());
        }

        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        debug!(
            "requesting {} {} (API version {})",
            request.method.as_str(),
            url,
            api_version.map_or_else(|| String::from("unset"), |v| v.to_string()),
        );

        let start_time = Utc::now().naive_utc();

        let response = builder.send()?;

        let status = response.status().as_u16();

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response.bytes()?.to_vec();

        let elapsed_time = Utc::now().naive_utc() - start_time;

        debug!(
            "got response for {} {} with status code {} in {}ms",
            request.method.as_str(),
            url,
            status,
            elapsed_time.num_milliseconds(),
        );

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
