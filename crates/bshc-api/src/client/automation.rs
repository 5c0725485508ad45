// Scenario and automation-rule endpoints.

use serde_json::Value;

use crate::client::BshcClient;
use crate::error::Error;
use crate::transport::{BshcResponse, Endpoint, Port};

impl BshcClient {
    /// Get all scenarios.
    ///
    /// `GET /smarthome/scenarios`
    pub async fn get_scenarios(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("scenarios").await
    }

    /// Trigger a scenario.
    ///
    /// `POST /smarthome/scenarios/{id}/triggers`
    pub async fn trigger_scenario(&self, scenario_id: &str) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::post(
            Port::Common,
            Self::smarthome(&format!("scenarios/{scenario_id}/triggers")),
        ))
        .await
    }

    /// Get all automation rules.
    ///
    /// `GET /smarthome/automation/rules`
    pub async fn get_automations(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("automation/rules").await
    }

    /// Trigger an automation rule.
    ///
    /// `PUT /smarthome/automation/rules/{id}/trigger`
    pub async fn trigger_automation(
        &self,
        automation_id: &str,
    ) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::put(
            Port::Common,
            Self::smarthome(&format!("automation/rules/{automation_id}/trigger")),
        ))
        .await
    }
}
