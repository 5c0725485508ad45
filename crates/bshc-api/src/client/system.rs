// Controller-level endpoints: information, connected clients, messages,
// and the backup/restore lifecycle.
//
// Backup and restore are stateful on the controller side; vendor status
// codes (405, 412, 403, ...) surface unchanged as HTTP errors.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use crate::client::BshcClient;
use crate::error::Error;
use crate::models::BinaryResponse;
use crate::transport::{BshcResponse, CallOptions, Endpoint, Port};

impl BshcClient {
    /// Get information about the controller.
    ///
    /// `GET /smarthome/information` (admin port)
    pub async fn get_information(&self) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::get(Port::Admin, Self::smarthome("information"))).await
    }

    /// Get all paired clients.
    ///
    /// `GET /smarthome/clients`
    pub async fn get_clients(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("clients").await
    }

    /// Get all messages.
    ///
    /// `GET /smarthome/messages`
    pub async fn get_messages(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("messages").await
    }

    /// Get a specific message.
    ///
    /// `GET /smarthome/messages/{id}`
    pub async fn get_message(&self, id: &str) -> Result<BshcResponse<Value>, Error> {
        self.get_resource(&format!("messages/{id}")).await
    }

    /// Delete a specific message.
    ///
    /// `DELETE /smarthome/messages/{id}`
    pub async fn delete_message(&self, id: &str) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::delete(Port::Common, Self::smarthome(&format!("messages/{id}"))))
            .await
    }

    /// Delete a batch of messages by id.
    ///
    /// `POST /smarthome/messages/batchDelete`
    pub async fn delete_messages(&self, ids: &[&str]) -> Result<BshcResponse<Value>, Error> {
        self.send(
            Endpoint::post(Port::Common, Self::smarthome("messages/batchDelete")).json(json!(ids)),
        )
        .await
    }

    // ── Backup lifecycle ─────────────────────────────────────────────

    /// Start creating a backup. The system password authorizes the
    /// operation; the optional encryption password protects the file.
    ///
    /// `POST /smarthome/system/backup`
    pub async fn create_backup(
        &self,
        system_password: SecretString,
        encryption_password: Option<&SecretString>,
    ) -> Result<BshcResponse<Value>, Error> {
        let mut endpoint = Endpoint::post(Port::Common, Self::smarthome("system/backup"));
        if let Some(password) = encryption_password {
            endpoint = endpoint.json(json!({ "encryptionPassword": password.expose_secret() }));
        }
        let options = CallOptions::with_system_password(system_password);
        self.transport().execute(&endpoint, &options).await
    }

    /// Get the backup status (state, readiness of the file).
    ///
    /// `GET /smarthome/system/backup/status`
    pub async fn get_backup_status(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("system/backup/status").await
    }

    /// Download the prepared backup file. The file name is taken from the
    /// `Content-Disposition` header when the controller provides one.
    ///
    /// `GET /smarthome/system/backup` (binary)
    pub async fn download_backup(&self) -> Result<BshcResponse<BinaryResponse>, Error> {
        let endpoint =
            Endpoint::get(Port::Common, Self::smarthome("system/backup")).expect_binary();
        self.call_binary(&endpoint, &CallOptions::default()).await
    }

    /// Delete the backup file from the controller.
    ///
    /// `DELETE /smarthome/system/backup`
    pub async fn delete_backup(&self) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::delete(Port::Common, Self::smarthome("system/backup"))).await
    }

    // ── Restore lifecycle ────────────────────────────────────────────

    /// Upload a backup file to restore from.
    ///
    /// `POST /smarthome/system/restore` (binary body)
    pub async fn upload_restore_file(&self, data: Vec<u8>) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::post(Port::Common, Self::smarthome("system/restore")).binary(data))
            .await
    }

    /// Get the restore status.
    ///
    /// `GET /smarthome/system/restore/status`
    pub async fn get_restore_status(&self) -> Result<BshcResponse<Value>, Error> {
        self.get_resource("system/restore/status").await
    }

    /// Trigger the restore from the previously uploaded file.
    ///
    /// `PUT /smarthome/system/restore`
    pub async fn start_restore(
        &self,
        system_password: SecretString,
    ) -> Result<BshcResponse<Value>, Error> {
        let endpoint = Endpoint::put(Port::Common, Self::smarthome("system/restore"));
        let options = CallOptions::with_system_password(system_password);
        self.transport().execute(&endpoint, &options).await
    }

    /// Delete the uploaded restore file.
    ///
    /// `DELETE /smarthome/system/restore`
    pub async fn delete_restore_file(&self) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::delete(Port::Common, Self::smarthome("system/restore"))).await
    }
}
