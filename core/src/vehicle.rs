//! Async facade: one method per vehicle operation.
//!
//! `Vehicle` pairs a `VehicleClient` with a `Transport`. Each call builds a
//! request from the current unit system, performs exactly one exchange and
//! maps the reply. Nothing is retried.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::client::VehicleClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::HttpResponse;
use crate::operation::Operation;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    ActionStatus, Location, Odometer, PagingOptions, PercentOpen, Permissions, VehicleInfo, Vin,
};
use crate::units::UnitSystem;

/// Handle for one vehicle: identity, credentials and unit preference.
#[derive(Clone)]
pub struct Vehicle {
    client: VehicleClient,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Vehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vehicle")
            .field("id", &self.client.id())
            .field("unit_system", &self.client.unit_system())
            .finish_non_exhaustive()
    }
}

impl Vehicle {
    /// Handle using the default config and a `ReqwestTransport`.
    pub fn new(id: &str, token: &str) -> Result<Self> {
        Self::with_config(&ClientConfig::default(), id, token)
    }

    pub fn with_config(config: &ClientConfig, id: &str, token: &str) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(
            VehicleClient::from_config(config, id, token),
            Arc::new(transport),
        ))
    }

    pub fn with_transport(client: VehicleClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.client.set_unit_system(unit_system);
        self
    }

    pub fn id(&self) -> &str {
        self.client.id()
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.client.unit_system()
    }

    /// Applies to requests built after this call.
    pub fn set_unit_system(&mut self, unit_system: UnitSystem) {
        self.client.set_unit_system(unit_system);
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn info(&self) -> Result<VehicleInfo> {
        self.fetch(Operation::Info, VehicleClient::parse_info).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn vin(&self) -> Result<Vin> {
        self.fetch(Operation::Vin, VehicleClient::parse_vin).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn location(&self) -> Result<Location> {
        self.fetch(Operation::Location, VehicleClient::parse_location).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id(), unit_system = %self.unit_system()))]
    pub async fn odometer(&self) -> Result<Odometer> {
        self.fetch(Operation::Odometer, VehicleClient::parse_odometer).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn permissions(&self, paging: PagingOptions) -> Result<Permissions> {
        self.fetch(Operation::Permissions(paging), VehicleClient::parse_permissions).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn disconnect(&self) -> Result<ActionStatus> {
        self.act(Operation::Disconnect).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn start_panic(&self) -> Result<ActionStatus> {
        self.act(Operation::StartPanic).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn stop_panic(&self) -> Result<ActionStatus> {
        self.act(Operation::StopPanic).await
    }

    /// Range checking happens in `PercentOpen::new`, before this is called.
    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn open_sunroof(&self, percent_open: PercentOpen) -> Result<ActionStatus> {
        self.act(Operation::OpenSunroof { percent_open }).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn close_sunroof(&self) -> Result<ActionStatus> {
        self.act(Operation::CloseSunroof).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn flash_headlights(&self) -> Result<ActionStatus> {
        self.act(Operation::FlashHeadlights).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn lock(&self) -> Result<ActionStatus> {
        self.act(Operation::Lock).await
    }

    #[instrument(skip(self), fields(vehicle = %self.id()))]
    pub async fn unlock(&self) -> Result<ActionStatus> {
        self.act(Operation::Unlock).await
    }

    async fn act(&self, operation: Operation) -> Result<ActionStatus> {
        self.fetch(operation, VehicleClient::parse_action).await
    }

    async fn fetch<T>(
        &self,
        operation: Operation,
        parse: fn(&VehicleClient, HttpResponse) -> Result<T>,
    ) -> Result<T> {
        let request = self.client.build(&operation)?;
        debug!(operation = operation.name(), method = %request.method, url = %request.url, "dispatching");
        let response = self.transport.send(request).await?;
        parse(&self.client, response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::VehicleError;
    use crate::http::HttpRequest;
    use crate::units::UNIT_SYSTEM_HEADER;

    /// Records requests and answers odometer reads per unit system.
    #[derive(Default)]
    struct RecordingTransport {
        seen: Mutex<Vec<HttpRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            if self.fail {
                return Err(VehicleError::Transport("connection refused".to_string()));
            }
            let body = match request.header(UNIT_SYSTEM_HEADER) {
                Some("imperial") => r#"{"distance":3.14}"#,
                Some(_) => r#"{"distance":2.71}"#,
                None => r#"{"status":"success"}"#,
            };
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse { status: 200, headers: Vec::new(), body: body.to_string() })
        }
    }

    fn vehicle(transport: Arc<RecordingTransport>) -> Vehicle {
        let client = VehicleClient::new("http://localhost:3000/v1.0", "v1", "t");
        Vehicle::with_transport(client, transport)
    }

    #[tokio::test]
    async fn switching_unit_system_affects_next_call_only() {
        let transport = Arc::new(RecordingTransport::default());
        let mut v = vehicle(transport.clone());

        assert_eq!(v.odometer().await.unwrap().distance, 2.71);
        v.set_unit_system(UnitSystem::Imperial);
        assert_eq!(v.odometer().await.unwrap().distance, 3.14);

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].header(UNIT_SYSTEM_HEADER), Some("metric"));
        assert_eq!(seen[1].header(UNIT_SYSTEM_HEADER), Some("imperial"));
    }

    #[test]
    fn out_of_range_sunroof_fails_before_any_future_exists() {
        let err = PercentOpen::new(7.0).unwrap_err();
        assert!(matches!(err, VehicleError::Validation(_)));
    }

    #[tokio::test]
    async fn open_sunroof_posts_validated_fraction() {
        let transport = Arc::new(RecordingTransport::default());
        let v = vehicle(transport.clone());
        let status = v.open_sunroof(PercentOpen::new(0.25).unwrap()).await.unwrap();
        assert!(status.is_success());
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"action":"OPEN","percentOpen":0.25}"#));
    }

    #[tokio::test]
    async fn transport_failures_are_surfaced() {
        let transport = Arc::new(RecordingTransport { fail: true, ..Default::default() });
        let err = vehicle(transport).start_panic().await.unwrap_err();
        assert!(matches!(err, VehicleError::Transport(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn debug_output_hides_token() {
        let v = vehicle(Arc::new(RecordingTransport::default()));
        let printed = format!("{v:?}");
        assert!(printed.contains("v1"));
        assert!(!printed.contains("Bearer"));
    }
}
