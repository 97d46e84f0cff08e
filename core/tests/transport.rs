//! Wire-level checks of `Vehicle` over `ReqwestTransport` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use vehicle_core::{ClientConfig, PagingOptions, PercentOpen, UnitSystem, Vehicle, VehicleError, USER_AGENT};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VEHICLE_PATH: &str = "/v1.0/vehicles/vehicle-1";

fn vehicle(server: &MockServer) -> Vehicle {
    let config = ClientConfig::with_base_url(&format!("{}/v1.0", server.uri())).unwrap();
    Vehicle::with_config(&config, "vehicle-1", "test-token").unwrap()
}

#[tokio::test]
async fn odometer_sends_auth_user_agent_and_unit_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{VEHICLE_PATH}/odometer")))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("User-Agent", USER_AGENT))
        .and(header("sc-unit-system", "metric"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("sc-unit-system", "metric")
                .set_body_json(json!({ "distance": 2.71 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let odo = vehicle(&server).odometer().await.unwrap();
    assert_eq!(odo.distance, 2.71);
    assert_eq!(odo.unit_system, Some(UnitSystem::Metric));
}

#[tokio::test]
async fn imperial_handle_gets_imperial_value_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{VEHICLE_PATH}/odometer")))
        .and(header("sc-unit-system", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "distance": 3.14 })))
        .expect(1)
        .mount(&server)
        .await;

    let vehicle = vehicle(&server).with_unit_system(UnitSystem::Imperial);
    assert_eq!(vehicle.odometer().await.unwrap().distance, 3.14);
}

#[tokio::test]
async fn permissions_limit_becomes_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{VEHICLE_PATH}/permissions")))
        .and(query_param("limit", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "permissions": ["read_odometer"] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{VEHICLE_PATH}/permissions")))
        .and(query_param_is_missing("limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "permissions": ["read_vehicle_info", "read_odometer", "control_security"] }),
        ))
        .mount(&server)
        .await;

    let v = vehicle(&server);
    let limited = v.permissions(PagingOptions::limit(1)).await.unwrap();
    let all = v.permissions(PagingOptions::default()).await.unwrap();
    assert_eq!(limited.permissions.len(), 1);
    assert_eq!(all.permissions.len(), 3);
}

#[tokio::test]
async fn start_panic_body_is_action_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{VEHICLE_PATH}/panic")))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "action": "START" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let status = vehicle(&server).start_panic().await.unwrap();
    assert_eq!(status.status, "success");
}

#[tokio::test]
async fn open_sunroof_spreads_percent_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{VEHICLE_PATH}/sunroof")))
        .and(body_json(json!({ "action": "OPEN", "percentOpen": 0.5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(vehicle(&server).open_sunroof(PercentOpen::new(0.5).unwrap()).await.unwrap().is_success());
}

#[tokio::test]
async fn disconnect_is_a_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{VEHICLE_PATH}/application")))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(vehicle(&server).disconnect().await.unwrap().is_success());
}

#[tokio::test]
async fn non_2xx_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{VEHICLE_PATH}/security")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "vehicle_state_error",
            "message": "Vehicle is asleep.",
            "description": "Wake the vehicle and retry.",
            "requestId": "0f6c1a2b"
        })))
        .mount(&server)
        .await;

    let err = vehicle(&server).lock().await.unwrap_err();
    match err {
        VehicleError::Api { status, code, message, description, request_id } => {
            assert_eq!(status, 409);
            assert_eq!(code.as_deref(), Some("vehicle_state_error"));
            assert_eq!(message.as_deref(), Some("Vehicle is asleep."));
            assert_eq!(description.as_deref(), Some("Wake the vehicle and retry."));
            assert_eq!(request_id.as_deref(), Some("0f6c1a2b"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_with_plain_body_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{VEHICLE_PATH}/vin")))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal server error"))
        .mount(&server)
        .await;

    let err = vehicle(&server).vin().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn failures_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{VEHICLE_PATH}/location")))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = vehicle(&server).location().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}
