use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, ErrorBody, Odometer, Permissions, Status, IMPERIAL_DISTANCE, METRIC_DISTANCE};
use tower::ServiceExt;

const VEHICLE: &str = "/v1.0/vehicles/36ab27d0-fd9d-4455-823a-ce30af709ffc";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> http::request::Builder {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(http::header::AUTHORIZATION, "Bearer test-token")
}

fn action_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, "Bearer test-token")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn delete(uri: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(http::header::AUTHORIZATION, "Bearer test-token")
        .body(String::new())
        .unwrap()
}

async fn odometer_with(app: Router, unit: Option<&str>) -> axum::response::Response {
    let mut builder = get(&format!("{VEHICLE}/odometer"));
    if let Some(unit) = unit {
        builder = builder.header("sc-unit-system", unit);
    }
    app.oneshot(builder.body(String::new()).unwrap()).await.unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_token_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("{VEHICLE}/odometer"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error, "authentication_error");
}

// --- odometer ---

#[tokio::test]
async fn odometer_metric() {
    let resp = odometer_with(app(), Some("metric")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["sc-unit-system"], "metric");
    let odo: Odometer = body_json(resp).await;
    assert_eq!(odo.distance, METRIC_DISTANCE);
}

#[tokio::test]
async fn odometer_imperial() {
    let resp = odometer_with(app(), Some("imperial")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["sc-unit-system"], "imperial");
    let odo: Odometer = body_json(resp).await;
    assert_eq!(odo.distance, IMPERIAL_DISTANCE);
}

#[tokio::test]
async fn odometer_defaults_to_metric() {
    let resp = odometer_with(app(), None).await;
    let odo: Odometer = body_json(resp).await;
    assert_eq!(odo.distance, METRIC_DISTANCE);
}

#[tokio::test]
async fn odometer_rejects_unknown_unit() {
    let resp = odometer_with(app(), Some("cubits")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert!(err.description.unwrap().contains("cubits"));
}

// --- permissions ---

#[tokio::test]
async fn permissions_unfiltered() {
    let resp = app()
        .oneshot(get(&format!("{VEHICLE}/permissions")).body(String::new()).unwrap())
        .await
        .unwrap();
    let perms: Permissions = body_json(resp).await;
    assert_eq!(perms.permissions.len(), 3);
}

#[tokio::test]
async fn permissions_limit() {
    let resp = app()
        .oneshot(get(&format!("{VEHICLE}/permissions?limit=1")).body(String::new()).unwrap())
        .await
        .unwrap();
    let perms: Permissions = body_json(resp).await;
    assert_eq!(perms.permissions, vec!["read_vehicle_info"]);
}

#[tokio::test]
async fn permissions_offset() {
    let resp = app()
        .oneshot(
            get(&format!("{VEHICLE}/permissions?limit=1&offset=2"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    let perms: Permissions = body_json(resp).await;
    assert_eq!(perms.permissions, vec!["control_security"]);
}

// --- actions ---

#[tokio::test]
async fn start_panic_succeeds() {
    let resp = app()
        .oneshot(action_request("POST", &format!("{VEHICLE}/panic"), r#"{"action":"START"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let status: Status = body_json(resp).await;
    assert_eq!(status.status, "success");
}

#[tokio::test]
async fn panic_rejects_unknown_action() {
    let resp = app()
        .oneshot(action_request("POST", &format!("{VEHICLE}/panic"), r#"{"action":"OPEN"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn open_sunroof_requires_percent_open() {
    let resp = app()
        .oneshot(action_request("POST", &format!("{VEHICLE}/sunroof"), r#"{"action":"OPEN"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app()
        .oneshot(action_request(
            "POST",
            &format!("{VEHICLE}/sunroof"),
            r#"{"action":"OPEN","percentOpen":0.5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn flash_headlights_succeeds() {
    let resp = app()
        .oneshot(action_request(
            "POST",
            &format!("{VEHICLE}/lights/headlights"),
            r#"{"action":"FLASH"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn action_with_malformed_json_is_rejected() {
    let resp = app()
        .oneshot(action_request("POST", &format!("{VEHICLE}/security"), "{not json"))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
    assert!(!body_bytes(resp).await.is_empty());
}

// --- disconnect ---

#[tokio::test]
async fn disconnect_revokes_later_calls() {
    let app = app();

    let resp = app.clone().oneshot(delete(&format!("{VEHICLE}/application"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let status: Status = body_json(resp).await;
    assert_eq!(status.status, "success");

    let resp = odometer_with(app, Some("metric")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.message, "Vehicle access has been revoked.");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let resp = app()
        .oneshot(get(&format!("{VEHICLE}/teleport")).body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}
