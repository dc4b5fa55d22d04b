use crate::client::rules::RulesApi;
use crate::errors::InspectrsError;
use crate::resource::InterfaceResource;
use crate::response::{
    IntrospectionStatus,
    StatusPage,
};
use crate::transport::base::{
    ApiRequest,
    ApiResponse,
    Method,
    Transport,
    MAX_VERSION_HEADER,
    MIN_VERSION_HEADER,
};
use crate::version::{
    ApiVersion,
    VersionRange,
};
use core::time::Duration;
use log::{
    debug,
    info,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::thread;

/// The default interval between poll rounds when waiting for introspection to finish. A huge
/// overall timeout is used by default, as a precise timeout should be set in the server settings.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// The default number of retries when waiting for introspection to finish.
pub const DEFAULT_MAX_RETRIES: u32 = 3600;

/// Args are standard client args that are stored with a client object -- they tune the status
/// poller and nothing else.
#[derive(Debug)]
pub struct Args {
    /// Sleep interval between poll rounds of `wait_for_finish`.
    pub retry_interval: Duration,
    /// Maximum number of poll retries before giving up, `None` meaning wait forever.
    pub max_retries: Option<u32>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            max_retries: Some(DEFAULT_MAX_RETRIES),
        }
    }
}

/// Get the advertised version range from a server, tolerating servers that predate version
/// advertising. `None` means the server does not advertise version support at all.
pub(crate) fn server_version_range(
    transport: &dyn Transport,
) -> Result<Option<VersionRange>, InspectrsError> {
    let response = transport.perform(&ApiRequest::new(Method::Get, ""), None)?;

    // HTTP Not Found is a valid response from older servers
    if response.status >= 400 && response.status != 404 {
        return Err(InspectrsError::Http {
            status: response.status,
            message: response.error_message(),
        });
    }

    let min_header = response.header(MIN_VERSION_HEADER);
    let max_header = response.header(MAX_VERSION_HEADER);

    if min_header.is_none() && max_header.is_none() {
        debug!("server does not advertise API version support");

        return Ok(None);
    }

    let minimum: ApiVersion = min_header.unwrap_or("1.0").parse()?;
    let maximum: ApiVersion = max_header.unwrap_or("1.0").parse()?;

    debug!("supported API version range is [{minimum}, {maximum}]");

    Ok(Some(VersionRange::new(minimum, maximum)))
}

/// Client is the primary object users work with -- it holds the negotiated API version and the
/// transport, and maps near one-to-one onto the HTTP endpoints of the introspection service.
pub struct Client {
    /// The standard client args.
    pub args: Args,
    api_version: ApiVersion,
    transport: Box<dyn Transport>,
}

impl core::fmt::Debug for Client {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client")
            .field("args", &self.args)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new Client instance. Users should generally go through the builder instead, which
    /// performs version negotiation.
    #[must_use]
    pub(crate) fn new(
        args: Args,
        api_version: ApiVersion,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            args,
            api_version,
            transport,
        }
    }

    /// The API version this client sends on every request.
    #[must_use]
    pub const fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Returns the introspection rules sub-API.
    #[must_use]
    pub const fn rules(&self) -> RulesApi<'_> {
        RulesApi::new(self)
    }

    /// Perform one request with the negotiated version attached and raise server reported errors.
    pub(crate) fn request(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, InspectrsError> {
        let response = self.transport.perform(&request, Some(self.api_version))?;

        if response.status == 404 {
            return Err(InspectrsError::NotFound {
                message: response.error_message(),
            });
        }

        if response.status >= 400 {
            return Err(InspectrsError::Http {
                status: response.status,
                message: response.error_message(),
            });
        }

        Ok(response)
    }

    /// Start introspection for a node. `manage_boot` indicates whether the server should manage
    /// boot during introspection; when `None` the server default is used.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn introspect(
        &self,
        node_id: &str,
        manage_boot: Option<bool>,
    ) -> Result<(), InspectrsError> {
        info!("starting introspection for node {node_id}");

        let mut request = ApiRequest::new(Method::Post, &format!("/introspection/{node_id}"));

        if let Some(manage_boot) = manage_boot {
            request = request.query("manage_boot", if manage_boot { "1" } else { "0" });
        }

        self.request(request)?;

        Ok(())
    }

    /// Get introspection status for a node.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn get_status(
        &self,
        node_id: &str,
    ) -> Result<IntrospectionStatus, InspectrsError> {
        self.request(ApiRequest::new(
            Method::Get,
            &format!("/introspection/{node_id}"),
        ))?
        .json()
    }

    /// List introspection statuses. Supports pagination via the marker and limit params; the
    /// items are sorted by the server according to the `started_at` attribute, newer first.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn list_statuses(
        &self,
        marker: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<IntrospectionStatus>, InspectrsError> {
        let mut request = ApiRequest::new(Method::Get, "/introspection");

        if let Some(marker) = marker {
            request = request.query("marker", marker);
        }

        if let Some(limit) = limit {
            request = request.query("limit", &limit.to_string());
        }

        let page: StatusPage = self.request(request)?.json()?;

        Ok(page.introspection)
    }

    /// Wait for introspection to finish for all of the given nodes, polling each pending node
    /// once per round and sleeping `args.retry_interval` between rounds. A node leaves the
    /// pending set as soon as its status reports finished; the loop terminates when the pending
    /// set is empty.
    ///
    /// Errors polling any single node abort the whole wait immediately -- statuses collected in
    /// earlier rounds are not returned. Cancellation is the host process's concern; the loop only
    /// stops cleanly between rounds.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError::WaitTimeout` if `args.max_retries` rounds were exhausted with
    /// nodes still pending, an `InspectrsError::Validation` if no nodes were given, and any error
    /// from the underlying status queries verbatim.
    pub fn wait_for_finish(
        &self,
        node_ids: &[&str],
    ) -> Result<BTreeMap<String, IntrospectionStatus>, InspectrsError> {
        if node_ids.is_empty() {
            return Err(InspectrsError::Validation(String::from(
                "at least one node is required to wait for",
            )));
        }

        let mut result = BTreeMap::new();
        let mut pending: Vec<String> = node_ids.iter().map(|&n| n.to_owned()).collect();
        let mut attempt: u32 = 0;

        loop {
            let mut still_pending = Vec::with_capacity(pending.len());

            for node_id in pending {
                let status = self.get_status(&node_id)?;

                if status.finished {
                    result.insert(node_id, status);
                } else {
                    still_pending.push(node_id);
                }
            }

            if still_pending.is_empty() {
                return Ok(result);
            }

            if let Some(max_retries) = self.args.max_retries {
                if attempt >= max_retries {
                    return Err(InspectrsError::WaitTimeout {
                        pending: still_pending,
                    });
                }
            }

            attempt = attempt.saturating_add(1);

            debug!(
                "still waiting for introspection results for {} nodes, attempt {}",
                still_pending.len(),
                attempt,
            );

            thread::sleep(self.args.retry_interval);

            pending = still_pending;
        }
    }

    /// Get introspection data from the last introspection of a node, parsed as JSON. `processed`
    /// selects the final processed data rather than the raw data received from the discovery
    /// agent.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server --
    /// notably a `NotFound` if the server does not store introspection data at all.
    pub fn get_data(
        &self,
        node_id: &str,
        processed: bool,
    ) -> Result<Value, InspectrsError> {
        self.data_request(node_id, processed)?.json()
    }

    /// Get introspection data from the last introspection of a node as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn get_data_raw(
        &self,
        node_id: &str,
        processed: bool,
    ) -> Result<Vec<u8>, InspectrsError> {
        Ok(self.data_request(node_id, processed)?.body)
    }

    fn data_request(
        &self,
        node_id: &str,
        processed: bool,
    ) -> Result<ApiResponse, InspectrsError> {
        let path = if processed {
            format!("/introspection/{node_id}/data")
        } else {
            format!("/introspection/{node_id}/data/unprocessed")
        };

        self.request(ApiRequest::new(Method::Get, &path))
    }

    /// Abort running introspection for a node.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn abort(
        &self,
        node_id: &str,
    ) -> Result<(), InspectrsError> {
        info!("aborting introspection for node {node_id}");

        self.request(ApiRequest::new(
            Method::Post,
            &format!("/introspection/{node_id}/abort"),
        ))?;

        Ok(())
    }

    /// Reprocess stored introspection data for a node.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn reprocess(
        &self,
        node_id: &str,
    ) -> Result<(), InspectrsError> {
        info!("reprocessing stored introspection data for node {node_id}");

        self.request(ApiRequest::new(
            Method::Post,
            &format!("/introspection/{node_id}/data/unprocessed"),
        ))?;

        Ok(())
    }

    /// Get the minimum and maximum supported API versions from the server. Servers that predate
    /// version advertising report the legacy \[1.0, 1.0\] range.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn server_api_versions(&self) -> Result<VersionRange, InspectrsError> {
        Ok(server_version_range(self.transport.as_ref())?.unwrap_or_default())
    }

    /// Get one row of interface data -- the selected fields, in selection order -- for the given
    /// node and interface. LLDP derived fields are read from the `lldp_processed` section of the
    /// stored introspection data and come back as JSON null when the switch reported nothing.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError::Validation` if the interface does not exist on the node, and
    /// any error from fetching the introspection data verbatim.
    pub fn get_interface_data(
        &self,
        node_id: &str,
        interface: &str,
        resource: &InterfaceResource,
    ) -> Result<Vec<Value>, InspectrsError> {
        let data = self.get_data(node_id, true)?;

        let Some(iface) = data.get("all_interfaces").and_then(|a| a.get(interface)) else {
            return Err(InspectrsError::Validation(format!(
                "interface {interface} was not found on this node"
            )));
        };

        Ok(interface_row(node_id, interface, iface, resource))
    }

    /// Get interface data rows for all of the interfaces on this node, sorted by interface name.
    /// When `vlans` is non-empty, only interfaces carrying at least one of the given VLAN ids are
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns any error from fetching the introspection data verbatim.
    pub fn get_all_interface_data(
        &self,
        node_id: &str,
        resource: &InterfaceResource,
        vlans: &[u64],
    ) -> Result<Vec<Vec<Value>>, InspectrsError> {
        let data = self.get_data(node_id, true)?;

        let Some(all_interfaces) = data.get("all_interfaces").and_then(Value::as_object) else {
            return Ok(vec![]);
        };

        let mut rows = vec![];

        for (name, iface) in all_interfaces {
            if !vlans.is_empty() {
                let on_interface = interface_vlan_ids(iface);

                if !vlans.iter().any(|v| on_interface.contains(v)) {
                    continue;
                }
            }

            rows.push(interface_row(node_id, name, iface, resource));
        }

        Ok(rows)
    }
}

/// The VLAN ids an interface carries, read from the processed LLDP data.
fn interface_vlan_ids(iface: &Value) -> Vec<u64> {
    iface
        .get("lldp_processed")
        .and_then(|lldp| lldp.get("switch_port_vlans"))
        .and_then(Value::as_array)
        .map(|vlans| {
            vlans
                .iter()
                .filter_map(|vlan| vlan.get("id").and_then(Value::as_u64))
                .collect()
        })
        .unwrap_or_default()
}

/// Build one interface row from the stored introspection data for the selected fields.
fn interface_row(
    node_id: &str,
    interface: &str,
    iface: &Value,
    resource: &InterfaceResource,
) -> Vec<Value> {
    let lldp = iface.get("lldp_processed");

    resource
        .fields()
        .iter()
        .map(|&field| match field {
            "node_ident" => Value::from(node_id),
            "interface" => Value::from(interface),
            "mac" => iface.get("mac").cloned().unwrap_or(Value::Null),
            "switch_port_vlan_ids" => Value::from(interface_vlan_ids(iface)),
            other => lldp
                .and_then(|l| l.get(other))
                .cloned()
                .unwrap_or(Value::Null),
        })
        .collect()
}
