use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use weather_core::{ErrorResponse, OpenWeatherProvider, WeatherResponse, WeatherService, router};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const UPSTREAM_PATH: &str = "/data/2.5/weather";

fn app(server: &MockServer, timeout: Duration) -> Router {
    let provider = OpenWeatherProvider::new(
        "TEST_KEY".into(),
        format!("{}{UPSTREAM_PATH}", server.uri()),
        "tr".into(),
        timeout,
    )
    .expect("client should build");

    router(WeatherService::new(Arc::new(provider)))
}

fn upstream_body(name: Option<&str>) -> Value {
    let mut body = json!({
        "coord": { "lon": 32.85, "lat": 39.92 },
        "weather": [{ "id": 800, "main": "Clear", "description": "açık", "icon": "01d" }],
        "main": {
            "temp": 23.1, "feels_like": 22.4, "temp_min": 21.0, "temp_max": 24.0,
            "pressure": 1012, "humidity": 35
        },
        "wind": { "speed": 3.6, "deg": 250 },
        "sys": { "type": 1, "country": "TR" },
        "cod": 200
    });
    if let Some(name) = name {
        body["name"] = json!(name);
    }
    body
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn returns_simplified_weather() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(UPSTREAM_PATH))
        .and(query_param("q", "Ankara"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "tr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body(Some("Ankara"))))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(

        app(&server, Duration::from_secs(5)),

        "/api/weather?city=Ankara",

    )

    .await;

    assert_eq!(status, StatusCode::OK);
    let resp: WeatherResponse = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(
        resp,
        WeatherResponse {
            city: "Ankara".into(),
            country: "TR".into(),
            temperature: 23.1,
            feels_like_temperature: 22.4,
            status_summary: "Açık".into(),
            humidity: 35,
            wind_speed: 3.6,
        }
    );
    assert_eq!(body.as_object().unwrap().len(), 7);
}

#[tokio::test]
async fn localized_route_and_parameter_are_supported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "İzmir"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body(Some("Izmir"))))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(
        app(&server, Duration::from_secs(5)),
        "/api/hava-durumu?sehir=%C4%B0zmir",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Izmir");
}

#[tokio::test]
async fn missing_name_falls_back_to_requested_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body(None)))
        .mount(&server)
        .await;

    let (status, body) = get(

        app(&server, Duration::from_secs(5)),

        "/api/weather?city=ankara",

    )

    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "ankara");
}

#[tokio::test]
async fn missing_or_empty_city_is_rejected_without_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body(Some("X"))))
        .expect(0)
        .mount(&server)
        .await;

    for uri in ["/api/weather", "/api/weather?city=", "/api/weather?town=Paris"] {
        let (status, body) = get(app(&server, Duration::from_secs(5)), uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "uri {uri}");
        let err: ErrorResponse = serde_json::from_value(body).unwrap();
        assert!(err.error.contains("city"));
    }
}

#[tokio::test]
async fn upstream_404_names_the_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "Atlantis"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"cod": "404", "message": "city not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(

        app(&server, Duration::from_secs(5)),

        "/api/weather?city=Atlantis",

    )

    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "City not found: Atlantis" }));
}

#[tokio::test]
async fn other_upstream_errors_mirror_status_without_leaking_body() {
    for code in [401u16, 500] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(code).set_body_string("secret provider diagnostics"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(

            app(&server, Duration::from_secs(5)),

            "/api/weather?city=Paris",

        )

        .await;

        assert_eq!(status.as_u16(), code);
        assert_eq!(
            body,
            json!({ "error": "Unexpected error from the weather provider" })
        );
    }
}

#[tokio::test]
async fn upstream_timeout_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(upstream_body(Some("Paris")))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let (status, body) = get(

        app(&server, Duration::from_millis(200)),

        "/api/weather?city=Paris",

    )

    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "error": "Weather provider is unreachable" }));
}

#[tokio::test]
async fn refused_connection_is_service_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = OpenWeatherProvider::new(
        "TEST_KEY".into(),
        format!("http://{addr}{UPSTREAM_PATH}"),
        "tr".into(),
        Duration::from_secs(2),
    )
    .unwrap();
    let app = router(WeatherService::new(Arc::new(provider)));

    let (status, body) = get(app, "/api/weather?city=Paris").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "error": "Weather provider is unreachable" }));
}

#[tokio::test]
async fn incomplete_upstream_body_is_internal_error() {
    let server = MockServer::start().await;
    let mut body = upstream_body(Some("Paris"));
    body.as_object_mut().unwrap().remove("main");
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let (status, body) = get(

        app(&server, Duration::from_secs(5)),

        "/api/weather?city=Paris",

    )

    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorResponse = serde_json::from_value(body).unwrap();
    assert!(!err.error.contains("main"));
}

#[tokio::test]
async fn slow_lookup_does_not_block_others() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "Slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(upstream_body(Some("Slow")))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "Fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body(Some("Fast"))))
        .mount(&server)
        .await;

    let app = app(&server, Duration::from_secs(5));
    let started = tokio::time::Instant::now();

    let slow = tokio::spawn(get(app.clone(), "/api/weather?city=Slow"));
    let (status, body) = get(app, "/api/weather?city=Fast").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Fast");
    assert!(started.elapsed() < Duration::from_millis(1000));

    let (slow_status, _) = slow.await.unwrap();
    assert_eq!(slow_status, StatusCode::OK);
}

#[tokio::test]
async fn health_reports_status() {
    let server = MockServer::start().await;

    let (status, body) = get(app(&server, Duration::from_secs(5)), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let server = MockServer::start().await;

    let (status, body) = get(app(&server, Duration::from_secs(5)), "/api/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Resource not found" }));
}

#[tokio::test]
async fn wrong_method_is_json_method_not_allowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body(Some("Paris"))))
        .expect(0)
        .mount(&server)
        .await;

    let response = app(&server, Duration::from_secs(5))
        .oneshot(
            Request::post("/api/weather?city=Paris")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(err.error, "Method not allowed");
}

#[tokio::test]
async fn undecodable_query_hides_deserializer_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body(Some("Paris"))))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = get(
        app(&server, Duration::from_secs(5)),
        "/api/weather?city=Paris&city=Rome",
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "error": "Invalid query string" }));
}
