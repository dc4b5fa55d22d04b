use crate::client::client::Client;
use crate::errors::InspectrsError;
use crate::response::{
    Rule,
    RulePage,
    RuleSummary,
};
use crate::transport::base::{
    ApiRequest,
    Method,
};
use log::info;
use serde_json::{
    json,
    Value,
};

/// `RulesApi` is the introspection rules sub-API. Do not create instances of this directly, use
/// `Client::rules` instead.
pub struct RulesApi<'a> {
    client: &'a Client,
}

impl<'a> RulesApi<'a> {
    /// Return a new instance of `RulesApi` borrowing the given client.
    #[must_use]
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create a new introspection rule from its parts. The rule UUID is generated server side
    /// when not specified.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError::Validation` if conditions or actions contain anything other
    /// than objects, and an `InspectrsError` on connection problems or errors reported from the
    /// server.
    pub fn create(
        &self,
        conditions: &[Value],
        actions: &[Value],
        uuid: Option<&str>,
        description: Option<&str>,
    ) -> Result<Rule, InspectrsError> {
        for (name, list) in [("conditions", conditions), ("actions", actions)] {
            if list.iter().any(|item| !item.is_object()) {
                return Err(InspectrsError::Validation(format!(
                    "expected a list of objects for the {name} argument"
                )));
            }
        }

        self.from_json(json!({
            "uuid": uuid,
            "conditions": conditions,
            "actions": actions,
            "description": description,
        }))
    }

    /// Import an introspection rule from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server --
    /// notably the server rejects rules with missing required fields.
    pub fn from_json(
        &self,
        rule: Value,
    ) -> Result<Rule, InspectrsError> {
        let imported: Rule = self
            .client
            .request(ApiRequest::new(Method::Post, "/rules").body(rule))?
            .json()?;

        info!("imported introspection rule {}", imported.uuid);

        Ok(imported)
    }

    /// List all introspection rules in their short representation.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn get_all(&self) -> Result<Vec<RuleSummary>, InspectrsError> {
        let page: RulePage = self
            .client
            .request(ApiRequest::new(Method::Get, "/rules"))?
            .json()?;

        Ok(page.rules)
    }

    /// Get detailed information about an introspection rule.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn get(
        &self,
        uuid: &str,
    ) -> Result<Rule, InspectrsError> {
        self.client
            .request(ApiRequest::new(Method::Get, &format!("/rules/{uuid}")))?
            .json()
    }

    /// Delete an introspection rule.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn delete(
        &self,
        uuid: &str,
    ) -> Result<(), InspectrsError> {
        info!("deleting introspection rule {uuid}");

        self.client
            .request(ApiRequest::new(Method::Delete, &format!("/rules/{uuid}")))?;

        Ok(())
    }

    /// Delete all introspection rules.
    ///
    /// # Errors
    ///
    /// Returns an `InspectrsError` on connection problems or errors reported from the server.
    pub fn delete_all(&self) -> Result<(), InspectrsError> {
        info!("deleting all introspection rules");

        self.client.request(ApiRequest::new(Method::Delete, "/rules"))?;

        Ok(())
    }
}
