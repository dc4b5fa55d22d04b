use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

/// `IntrospectionStatus` is the per-node status record returned from status queries. It is an
/// immutable snapshot -- a fresh query yields a new record, never a mutation of an old one.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntrospectionStatus {
    /// UUID of the node the status belongs to.
    pub uuid: String,
    /// Indicates if introspection has finished (successfully or not).
    pub finished: bool,
    /// The error message, if introspection finished with an error.
    #[serde(default)]
    pub error: Option<String>,
    /// ISO8601 timestamp of when introspection started.
    #[serde(default)]
    pub started_at: Option<String>,
    /// ISO8601 timestamp of when introspection finished, if it has.
    #[serde(default)]
    pub finished_at: Option<String>,
    /// Name of the current introspection state, reported by newer servers.
    #[serde(default)]
    pub state: Option<String>,
    /// Self-link to this status.
    #[serde(default)]
    pub links: Option<Value>,
}

impl IntrospectionStatus {
    /// Indicates if this (finished) status carries an error.
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// The envelope the server wraps status listings in.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusPage {
    /// The statuses themselves.
    pub introspection: Vec<IntrospectionStatus>,
}

/// `Rule` is the full representation of an introspection rule as echoed back by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rule {
    /// UUID of the rule.
    pub uuid: String,
    /// Human readable description of the rule.
    #[serde(default)]
    pub description: Option<String>,
    /// The rule conditions, schema defined by the server.
    #[serde(default)]
    pub conditions: Vec<Value>,
    /// The rule actions, schema defined by the server.
    #[serde(default)]
    pub actions: Vec<Value>,
    /// Self-link to this rule.
    #[serde(default)]
    pub links: Option<Value>,
}

/// `RuleSummary` is the short rule representation returned from rule listings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleSummary {
    /// UUID of the rule.
    pub uuid: String,
    /// Human readable description of the rule.
    #[serde(default)]
    pub description: Option<String>,
    /// Self-link to this rule.
    #[serde(default)]
    pub links: Option<Value>,
}

/// The envelope the server wraps rule listings in.
#[derive(Debug, Deserialize)]
pub(crate) struct RulePage {
    /// The rule summaries themselves.
    pub rules: Vec<RuleSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_deserializes_with_missing_optional_fields() {
        let status: IntrospectionStatus =
            serde_json::from_str(r#"{"uuid": "uuid1", "finished": false}"#).unwrap();

        assert_eq!("uuid1", status.uuid);
        assert!(!status.finished);
        assert!(status.error.is_none());
        assert!(status.state.is_none());
        assert!(!status.failed());
    }

    #[test]
    fn status_deserializes_all_fields() {
        let status: IntrospectionStatus = serde_json::from_str(
            r#"{
                "uuid": "uuid1",
                "finished": true,
                "error": "boom",
                "started_at": "1970-01-01T00:00",
                "finished_at": "1970-01-01T00:10",
                "state": "error",
                "links": [{"href": "/v1/introspection/uuid1", "rel": "self"}]
            }"#,
        )
        .unwrap();

        assert!(status.finished);
        assert!(status.failed());
        assert_eq!(Some("boom"), status.error.as_deref());
        assert_eq!(Some("error"), status.state.as_deref());
    }

    #[test]
    fn rule_page_unwraps_envelope() {
        let page: RulePage = serde_json::from_str(
            r#"{"rules": [{"uuid": "rule1", "description": "d1"}, {"uuid": "rule2"}]}"#,
        )
        .unwrap();

        assert_eq!(2, page.rules.len());
        assert_eq!("rule1", page.rules[0].uuid);
        assert!(page.rules[1].description.is_none());
    }
}
