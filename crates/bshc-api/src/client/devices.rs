// Room, device, and device-service endpoints.

use serde_json::{Value, json};

use crate::client::BshcClient;
use crate::error::Error;
use crate::transport::{BshcResponse, Endpoint, Port};

impl BshcClient {
    /// Get all rooms.
    ///
    /// `GET /smarthome/rooms`
    pub async fn get_rooms(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("rooms").await
    }

    /// Get a specific room.
    ///
    /// `GET /smarthome/rooms/{id}`
    pub async fn get_room(&self, id: &str) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("rooms/{id}")).await
    }

    /// Get all devices.
    ///
    /// `GET /smarthome/devices`
    pub async fn get_devices(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("devices").await
    }

    /// Get a specific device.
    ///
    /// `GET /smarthome/devices/{id}`
    pub async fn get_device(&self, device_id: &str) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("devices/{device_id}")).await
    }

    /// Get the supported device types.
    ///
    /// `GET /smarthome/configuration/supportedDeviceTypes`
    pub async fn get_supported_device_types(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("configuration/supportedDeviceTypes").await
    }

    /// Get services of all devices.
    ///
    /// `GET /smarthome/services`
    pub async fn get_devices_services(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("services").await
    }

    /// Get all services of one device.
    ///
    /// `GET /smarthome/devices/{deviceId}/services/`
    pub async fn get_device_services(&self, device_id: &str) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("devices/{device_id}/services/")).await
    }

    /// Get one service of one device.
    ///
    /// `GET /smarthome/devices/{deviceId}/services/{serviceId}`
    pub async fn get_device_service(
        &self,
        device_id: &str,
        service_id: &str,
    ) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("devices/{device_id}/services/{service_id}"))
            .await
    }

    /// Get the service ids available on a device.
    ///
    /// Convenience over [`get_device_services`](Self::get_device_services):
    /// extracts the `id` field of every returned service.
    pub async fn get_device_service_ids(&self, device_id: &str) -> Result<Vec<String>, Error> {
        let response = self.get_device_services(device_id).await?;
        let ids = response
            .payload
            .as_ref()
            .and_then(Value::as_array)
            .map(|services| {
                services
                    .iter()
                    .filter_map(|service| service["id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    /// Set a new value for a device-service state. The body must carry the
    /// vendor `@type` discriminator or the controller rejects it.
    ///
    /// `PUT /smarthome/{path}/state`
    pub async fn put_state(&self, path: &str, data: Value) -> Result<BshcResponse<Value>, Error> {
        self.send(
            Endpoint::put(Port::Common, Self::smarthome(&format!("{path}/state"))).json(data),
        )
        .await
    }

    /// Get the open doors/windows status.
    ///
    /// `GET /smarthome/doors-windows/openwindows`
    pub async fn get_open_windows(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("doors-windows/openwindows").await
    }

    /// Get all user-defined states.
    ///
    /// `GET /smarthome/userdefinedstates`
    pub async fn get_user_defined_states(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("userdefinedstates").await
    }

    /// Get a specific user-defined state.
    ///
    /// `GET /smarthome/userdefinedstates/{id}`
    pub async fn get_user_defined_state(&self, id: &str) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("userdefinedstates/{id}")).await
    }

    /// Activate or deactivate a user-defined state.
    ///
    /// `PUT /smarthome/userdefinedstates/{id}`
    pub async fn set_user_defined_state(
        &self,
        id: &str,
        state: bool,
    ) -> Result<BshcResponse<Value>, Error> {
        let data = json!({ "@type": "userDefinedState", "state": state });
        self.send(
            Endpoint::put(Port::Common, Self::smarthome(&format!("userdefinedstates/{id}")))
                .json(data),
        )
        .await
    }
}
