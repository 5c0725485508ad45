// Intrusion detection, presence simulation, and alarm endpoints.

use serde_json::{Value, json};

use crate::client::{BshcClient, with_default_type};
use crate::error::Error;
use crate::transport::{BshcResponse, Endpoint, Port};

const INTRUSION_SERVICE: &str = "devices/intrusionDetectionSystem/services/IntrusionDetectionControl";
const PRESENCE_SERVICE: &str =
    "devices/presenceSimulationService/services/PresenceSimulationConfiguration";

impl BshcClient {
    /// Get the alarm state of the legacy intrusion detection service.
    ///
    /// `GET /smarthome/devices/intrusionDetectionSystem/services/IntrusionDetectionControl/state`
    pub async fn get_alarm_state(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("{INTRUSION_SERVICE}/state")).await
    }

    /// Arm or disarm the alarm via the legacy intrusion detection service.
    pub async fn set_alarm_state(&self, armed: bool) -> Result<BshcResponse<Value>, Error> {
        let value = if armed { "SYSTEM_ARMED" } else { "SYSTEM_DISARMED" };
        let data = json!({ "@type": "intrusionDetectionControlState", "value": value });
        self.put_state(INTRUSION_SERVICE, data).await
    }

    /// Get the intrusion detection system state.
    ///
    /// `GET /smarthome/intrusion/states/system`
    pub async fn get_intrusion_detection_system_state(
        &self,
    ) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("intrusion/states/system").await
    }

    /// Arm the intrusion detection system. Without a profile id the last
    /// active profile is used.
    ///
    /// `POST /smarthome/intrusion/actions/arm`
    pub async fn arm_intrusion_detection_system(
        &self,
        profile_id: Option<i64>,
    ) -> Result<BshcResponse<Value>, Error> {
        let mut endpoint =
            Endpoint::post(Port::Common, Self::smarthome("intrusion/actions/arm"));
        if let Some(profile_id) = profile_id {
            endpoint = endpoint.json(json!({ "@type": "armRequest", "profileId": profile_id }));
        }
        self.send(endpoint).await
    }

    /// Disarm the intrusion detection system.
    ///
    /// `POST /smarthome/intrusion/actions/disarm`
    pub async fn disarm_intrusion_detection_system(&self) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::post(Port::Common, Self::smarthome("intrusion/actions/disarm")))
            .await
    }

    /// Mute the intrusion detection system.
    ///
    /// `POST /smarthome/intrusion/actions/mute`
    pub async fn mute_intrusion_detection_system(&self) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::post(Port::Common, Self::smarthome("intrusion/actions/mute")))
            .await
    }

    /// Get the presence simulation configuration.
    ///
    /// `GET /smarthome/devices/presenceSimulationService/services/PresenceSimulationConfiguration/state`
    pub async fn get_presence_simulation(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("{PRESENCE_SERVICE}/state")).await
    }

    /// Enable or disable presence simulation.
    pub async fn set_presence_simulation(
        &self,
        enabled: bool,
    ) -> Result<BshcResponse<Value>, Error> {
        let data = json!({ "@type": "presenceSimulationConfigurationState", "enabled": enabled });
        self.put_state(PRESENCE_SERVICE, data).await
    }

    /// Get the water alarm state.
    ///
    /// `GET /smarthome/wateralarm`
    pub async fn get_water_alarm(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("wateralarm").await
    }

    /// Get the water alarm configuration.
    ///
    /// `GET /smarthome/wateralarm/configuration`
    pub async fn get_water_alarm_configuration(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("wateralarm/configuration").await
    }

    /// Mute the water alarm.
    ///
    /// `PUT /smarthome/wateralarm/actions/mute`
    pub async fn mute_water_alarm(&self) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::put(Port::Common, Self::smarthome("wateralarm/actions/mute")))
            .await
    }

    /// Update the water alarm configuration. `@type` defaults to
    /// `waterAlarmSystemConfiguration` when absent.
    ///
    /// `PUT /smarthome/wateralarm/configuration`
    pub async fn update_water_alarm(&self, data: Value) -> Result<BshcResponse<Value>, Error> {
        let data = with_default_type(data, "waterAlarmSystemConfiguration");
        self.send(
            Endpoint::put(Port::Common, Self::smarthome("wateralarm/configuration")).json(data),
        )
        .await
    }

    /// Get the air purity guardian configuration.
    ///
    /// `GET /smarthome/airquality/airpurityguardian`
    pub async fn get_air_purity_guardian(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("airquality/airpurityguardian").await
    }

    /// Update an air purity guardian. `@type` defaults to
    /// `airPurityGuardian` when absent.
    ///
    /// `PUT /smarthome/airquality/airpurityguardian/{id}`
    pub async fn update_air_purity_guardian(
        &self,
        id: &str,
        data: Value,
    ) -> Result<BshcResponse<Value>, Error> {
        let data = with_default_type(data, "airPurityGuardian");
        self.send(
            Endpoint::put(
                Port::Common,
                Self::smarthome(&format!("airquality/airpurityguardian/{id}")),
            )
            .json(data),
        )
        .await
    }

    /// Get the motion lights configuration.
    ///
    /// `GET /smarthome/motionlights`
    pub async fn get_motion_lights(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("motionlights").await
    }

    /// Update a motion light. `@type` defaults to `motionlight` when absent.
    ///
    /// `PUT /smarthome/motionlights/{id}`
    pub async fn update_motion_lights(
        &self,
        id: &str,
        data: Value,
    ) -> Result<BshcResponse<Value>, Error> {
        let data = with_default_type(data, "motionlight");
        self.send(
            Endpoint::put(Port::Common, Self::smarthome(&format!("motionlights/{id}"))).json(data),
        )
        .await
    }
}
