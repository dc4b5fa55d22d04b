use crate::errors::InspectrsError;
use once_cell::sync::OnceCell;

/// Interface fields displayed by default -- kept in logical (not sorted) order.
pub const DEFAULT_FIELD_IDS: [&str; 5] = [
    "interface",
    "mac",
    "switch_port_vlan_ids",
    "switch_chassis_id",
    "switch_port_id",
];

/// Returns (once) the registry of all known interface fields mapped to their display labels,
/// sorted by field id.
pub fn interface_fields() -> &'static [(&'static str, &'static str)] {
    static FIELDS: OnceCell<Vec<(&'static str, &'static str)>> = OnceCell::new();

    FIELDS.get_or_init(|| {
        let mut fields = vec![
            ("interface", "Interface"),
            ("mac", "MAC Address"),
            ("node_ident", "Node"),
            ("switch_capabilities_enabled", "Switch Capabilities Enabled"),
            ("switch_capabilities_support", "Switch Capabilities Supported"),
            ("switch_chassis_id", "Switch Chassis ID"),
            ("switch_mgmt_addresses", "Switch Management Addresses"),
            (
                "switch_port_autonegotiation_enabled",
                "Switch Port Autonegotiation Enabled",
            ),
            (
                "switch_port_autonegotiation_support",
                "Switch Port Autonegotiation Supported",
            ),
            ("switch_port_description", "Switch Port Description"),
            ("switch_port_id", "Switch Port ID"),
            (
                "switch_port_link_aggregation_enabled",
                "Switch Port Link Aggregation Enabled",
            ),
            (
                "switch_port_link_aggregation_support",
                "Switch Port Link Aggregation Supported",
            ),
            (
                "switch_port_link_aggregation_id",
                "Switch Port Link Aggregation ID",
            ),
            ("switch_port_management_vlan_id", "Switch Port Mgmt VLAN ID"),
            ("switch_port_mau_type", "Switch Port Mau Type"),
            ("switch_port_mtu", "Switch Port MTU"),
            (
                "switch_port_physical_capabilities",
                "Switch Port Physical Capabilities",
            ),
            (
                "switch_port_protocol_vlan_enabled",
                "Switch Port Protocol VLAN Enabled",
            ),
            (
                "switch_port_protocol_vlan_support",
                "Switch Port Protocol VLAN Supported",
            ),
            (
                "switch_port_protocol_vlan_ids",
                "Switch Port Protocol VLAN IDs",
            ),
            ("switch_port_untagged_vlan_id", "Switch Port Untagged VLAN"),
            ("switch_port_vlans", "Switch Port VLANs"),
            ("switch_port_vlan_ids", "Switch Port VLAN IDs"),
            ("switch_protocol_identities", "Switch Protocol Identities"),
            ("switch_system_description", "Switch System Description"),
            ("switch_system_name", "Switch System Name"),
        ];

        fields.sort_unstable_by_key(|&(id, _)| id);

        fields
    })
}

/// Look up the display label for a known interface field id.
#[must_use]
pub fn label_for(field_id: &str) -> Option<&'static str> {
    interface_fields()
        .iter()
        .find(|&&(id, _)| id == field_id)
        .map(|&(_, label)| label)
}

/// `InterfaceResource` is a validated selection of interface fields -- the columns an interface
/// listing is built from, with their display labels.
#[derive(Debug, Clone)]
pub struct InterfaceResource {
    fields: Vec<&'static str>,
    labels: Vec<&'static str>,
}

impl InterfaceResource {
    /// Return a new instance of `InterfaceResource` for the given field ids, preserving the
    /// user-entered order.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError::Validation` if any field id is not a known interface field.
    pub fn new(field_ids: &[&str]) -> Result<Self, InspectrsError> {
        let mut fields = Vec::with_capacity(field_ids.len());
        let mut labels = Vec::with_capacity(field_ids.len());

        for field_id in field_ids {
            let Some(position) = interface_fields()
                .iter()
                .position(|&(id, _)| id == *field_id)
            else {
                return Err(InspectrsError::Validation(format!(
                    "unknown interface field '{field_id}'"
                )));
            };

            let (id, label) = interface_fields()[position];

            fields.push(id);
            labels.push(label);
        }

        Ok(Self { fields, labels })
    }

    /// Return a new instance of `InterfaceResource` selecting every known field, sorted by field
    /// id.
    #[must_use]
    pub fn detailed() -> Self {
        Self {
            fields: interface_fields().iter().map(|&(id, _)| id).collect(),
            labels: interface_fields().iter().map(|&(_, label)| label).collect(),
        }
    }

    /// The selected field ids.
    #[must_use]
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    /// The display labels for the selected fields.
    #[must_use]
    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }
}

impl Default for InterfaceResource {
    /// The default field selection -- the handful of fields most listings care about.
    ///
    /// # Panics
    ///
    /// Can in theory panic if the default field ids fall out of the registry, which would be a
    /// bug caught by tests.
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::new(&DEFAULT_FIELD_IDS).expect("default interface fields must be known")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_keeps_logical_order() {
        let resource = InterfaceResource::default();

        assert_eq!(&DEFAULT_FIELD_IDS, resource.fields());
        assert_eq!(
            &[
                "Interface",
                "MAC Address",
                "Switch Port VLAN IDs",
                "Switch Chassis ID",
                "Switch Port ID"
            ],
            resource.labels()
        );
    }

    #[test]
    fn custom_selection_preserves_user_order() {
        let resource = InterfaceResource::new(&["switch_port_mtu", "interface"]).unwrap();

        assert_eq!(&["switch_port_mtu", "interface"], resource.fields());
        assert_eq!(&["Switch Port MTU", "Interface"], resource.labels());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = InterfaceResource::new(&["interface", "nope"]).unwrap_err();

        assert!(matches!(err, InspectrsError::Validation(_)));
    }

    #[test]
    fn detailed_selection_is_sorted_and_complete() {
        let resource = InterfaceResource::detailed();

        assert_eq!(interface_fields().len(), resource.fields().len());

        let mut sorted = resource.fields().to_vec();
        sorted.sort_unstable();

        assert_eq!(&sorted, resource.fields());
    }
}
