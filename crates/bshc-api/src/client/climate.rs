// Climate schedule and template endpoints.

use serde_json::Value;

use crate::client::BshcClient;
use crate::error::Error;
use crate::transport::{BshcResponse, Endpoint, Port};

/// Climate schedule type. The controller defaults to heating when the
/// caller does not care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleType {
    #[default]
    Heating,
    Cooling,
}

impl ScheduleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heating => "HEATING",
            Self::Cooling => "COOLING",
        }
    }
}

impl BshcClient {
    /// Get the climate schedules of a device.
    ///
    /// `GET /smarthome/climate/schedule/{deviceId}/{type}`
    pub async fn get_climate_schedules(
        &self,
        device_id: &str,
        schedule_type: ScheduleType,
    ) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("climate/schedule/{device_id}/{}", schedule_type.as_str()))
            .await
    }

    /// Create a new climate schedule for a device.
    ///
    /// `POST /smarthome/climate/schedule/{deviceId}`
    pub async fn create_climate_schedule(
        &self,
        device_id: &str,
        data: Value,
    ) -> Result<BshcResponse<Value>, Error> {
        self.send(
            Endpoint::post(Port::Common, Self::smarthome(&format!("climate/schedule/{device_id}")))
                .json(data),
        )
        .await
    }

    /// Update an existing climate schedule.
    ///
    /// `PUT /smarthome/climate/schedule/{deviceId}`
    pub async fn update_climate_schedule(
        &self,
        device_id: &str,
        data: Value,
    ) -> Result<BshcResponse<Value>, Error> {
        self.send(
            Endpoint::put(Port::Common, Self::smarthome(&format!("climate/schedule/{device_id}")))
                .json(data),
        )
        .await
    }

    /// Activate a climate schedule.
    ///
    /// `PUT /smarthome/climate/schedule/{deviceId}/{id}/activate`
    pub async fn activate_climate_schedule(
        &self,
        device_id: &str,
        schedule_id: &str,
    ) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::put(
            Port::Common,
            Self::smarthome(&format!("climate/schedule/{device_id}/{schedule_id}/activate")),
        ))
        .await
    }

    /// Delete a climate schedule.
    ///
    /// `DELETE /smarthome/climate/schedule/{deviceId}/{id}`
    pub async fn delete_climate_schedule(
        &self,
        device_id: &str,
        schedule_id: &str,
    ) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::delete(
            Port::Common,
            Self::smarthome(&format!("climate/schedule/{device_id}/{schedule_id}")),
        ))
        .await
    }

    /// Get the climate templates.
    ///
    /// `GET /smarthome/climate/templates/{type}`
    pub async fn get_climate_templates(
        &self,
        schedule_type: ScheduleType,
    ) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("climate/templates/{}", schedule_type.as_str()))
            .await
    }
}
