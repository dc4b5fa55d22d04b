use crate::client::client::{
    server_version_range,
    Args,
    Client,
};
use crate::errors::InspectrsError;
use crate::transport::base::{
    Transport,
    TransportArgs,
};
use crate::transport::http::Http;
use crate::version::{
    self,
    ApiVersion,
    DEFAULT_API_VERSION,
    MAX_API_VERSION,
};
use core::time::Duration;
use log::{
    info,
    warn,
};

/// `Builder` is a struct that holds a bunch of settings/defaults that can be used to build a
/// Client object.
pub struct Builder {
    args: Args,
    transport_args: TransportArgs,
    api_version: Option<ApiVersion>,
}

#[allow(clippy::missing_const_for_fn)]
#[allow(clippy::return_self_not_must_use)]
#[allow(clippy::must_use_candidate)]
impl Builder {
    /// Return a new instance of `Builder` for the given service URL (in form
    /// `http://host:port[/vMAJ]`) with sane defaults set.
    pub fn new(base_url: &str) -> Self {
        Self {
            args: Args::default(),
            transport_args: TransportArgs::new(base_url),
            api_version: None,
        }
    }

    /// Sets the API version the server must support. When left unset the client speaks the fixed
    /// default version and performs no negotiation round trip.
    pub fn api_version(
        mut self,
        v: ApiVersion,
    ) -> Self {
        self.api_version = Some(v);

        self
    }

    /// Sets the bearer/token credential sent with each request.
    pub fn auth_token(
        mut self,
        s: &str,
    ) -> Self {
        self.transport_args.auth_token = Some(s.to_owned());

        self
    }

    /// Sets the timeout for each individual HTTP request.
    pub fn timeout(
        mut self,
        d: Duration,
    ) -> Self {
        self.transport_args.timeout = d;

        self
    }

    /// Sets the sleep interval between poll rounds when waiting for introspection to finish.
    pub fn retry_interval(
        mut self,
        d: Duration,
    ) -> Self {
        self.args.retry_interval = d;

        self
    }

    /// Sets the maximum number of poll retries when waiting for introspection to finish --
    /// `None` means wait forever.
    pub fn max_retries(
        mut self,
        n: Option<u32>,
    ) -> Self {
        self.args.max_retries = n;

        self
    }

    /// Build "builds" and returns a Client object over the standard HTTP transport, negotiating
    /// the API version first if one was requested.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError::VersionMismatch` if the requested version falls outside the
    /// server advertised range, and an `InspectrsError::Transport` on connection problems during
    /// negotiation.
    pub fn build(self) -> Result<Client, InspectrsError> {
        let Self {
            args,
            mut transport_args,
            api_version,
        } = self;

        let major = api_version.map_or(DEFAULT_API_VERSION.major, |v| v.major);
        let postfix = format!("/v{major}");

        if !transport_args.base_url.ends_with(&postfix) {
            transport_args.base_url.push_str(&postfix);
        }

        let transport = Http::new(transport_args)?;

        Self::negotiate_and_build(args, api_version, Box::new(transport))
    }

    /// Like `build` but over a caller provided transport -- the base URL handling is the
    /// transport's concern in this case.
    ///
    /// # Errors
    ///
    /// Returns the same errors as `build`.
    pub fn build_with_transport(
        self,
        transport: Box<dyn Transport>,
    ) -> Result<Client, InspectrsError> {
        Self::negotiate_and_build(self.args, self.api_version, transport)
    }

    fn negotiate_and_build(
        args: Args,
        api_version: Option<ApiVersion>,
        transport: Box<dyn Transport>,
    ) -> Result<Client, InspectrsError> {
        let resolved = match api_version {
            None => DEFAULT_API_VERSION,
            Some(requested) => {
                if MAX_API_VERSION < requested {
                    warn!(
                        "version {requested} exceeds {MAX_API_VERSION}, the maximum this client \
                        was designed to work with -- the server might still support it"
                    );
                }

                let advertised = server_version_range(transport.as_ref())?;

                version::negotiate(requested, advertised)?
            }
        };

        info!("using introspection API version {resolved}");

        Ok(Client::new(args, resolved, transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::base::{
        ApiRequest,
        ApiResponse,
        MAX_VERSION_HEADER,
        MIN_VERSION_HEADER,
    };
    use std::cell::Cell;
    use std::rc::Rc;

    /// A transport that always answers with the given version headers, counting requests.
    struct AdvertisingTransport {
        headers: Vec<(String, String)>,
        requests: Rc<Cell<u32>>,
    }

    impl Transport for AdvertisingTransport {
        fn perform(
            &self,
            _request: &ApiRequest,
            _api_version: Option<ApiVersion>,
        ) -> Result<ApiResponse, InspectrsError> {
            self.requests.set(self.requests.get() + 1);

            Ok(ApiResponse {
                status: 200,
                headers: self.headers.clone(),
                body: vec![],
            })
        }
    }

    fn advertising(
        min: &str,
        max: &str,
    ) -> (Box<dyn Transport>, Rc<Cell<u32>>) {
        let requests = Rc::new(Cell::new(0));

        let transport = AdvertisingTransport {
            headers: vec![
                (MIN_VERSION_HEADER.to_owned(), min.to_owned()),
                (MAX_VERSION_HEADER.to_owned(), max.to_owned()),
            ],
            requests: Rc::clone(&requests),
        };

        (Box::new(transport), requests)
    }

    #[test]
    fn no_requested_version_skips_negotiation_entirely() {
        let (transport, requests) = advertising("1.0", "1.9");

        let client = Builder::new("http://example.com:5050")
            .build_with_transport(transport)
            .unwrap();

        assert_eq!(DEFAULT_API_VERSION, client.api_version());
        assert_eq!(0, requests.get());
    }

    #[test]
    fn requested_version_in_range_is_kept() {
        let (transport, requests) = advertising("1.0", "1.9");

        let client = Builder::new("http://example.com:5050")
            .api_version(ApiVersion::new(1, 5))
            .build_with_transport(transport)
            .unwrap();

        assert_eq!(ApiVersion::new(1, 5), client.api_version());
        assert_eq!(1, requests.get());
    }

    #[test]
    fn requested_version_outside_range_fails() {
        let (transport, _requests) = advertising("1.0", "1.3");

        let err = Builder::new("http://example.com:5050")
            .api_version(ApiVersion::new(1, 5))
            .build_with_transport(transport)
            .unwrap_err();

        assert!(matches!(err, InspectrsError::VersionMismatch { .. }));
    }

    #[test]
    fn non_advertising_server_resolves_to_legacy_default() {
        let requests = Rc::new(Cell::new(0));

        let transport = AdvertisingTransport {
            headers: vec![],
            requests: Rc::clone(&requests),
        };

        let client = Builder::new("http://example.com:5050")
            .api_version(ApiVersion::new(1, 5))
            .build_with_transport(Box::new(transport))
            .unwrap();

        assert_eq!(DEFAULT_API_VERSION, client.api_version());
    }

    /// An old server that answers the probe with a plain 404 and no version headers.
    struct NotFoundTransport;

    impl Transport for NotFoundTransport {
        fn perform(
            &self,
            _request: &ApiRequest,
            _api_version: Option<ApiVersion>,
        ) -> Result<ApiResponse, InspectrsError> {
            Ok(ApiResponse {
                status: 404,
                headers: vec![],
                body: vec![],
            })
        }
    }

    #[test]
    fn probe_tolerates_not_found_from_old_servers() {
        let client = Builder::new("http://example.com:5050")
            .api_version(ApiVersion::new(1, 5))
            .build_with_transport(Box::new(NotFoundTransport))
            .unwrap();

        assert_eq!(DEFAULT_API_VERSION, client.api_version());
    }
}
