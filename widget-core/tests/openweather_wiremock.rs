//! OpenWeather provider and widget against a mock HTTP server.

use std::{sync::Arc, time::Duration};

use weather_widget_core::{
    FETCH_ERROR_MESSAGE, FetchError, TemperatureUnit, WeatherProvider, WeatherWidget,
    WidgetOptions, provider::openweather::OpenWeatherProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn london_body() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "base": "stations",
        "main": {
            "temp": 283.15,
            "feels_like": 282.1,
            "temp_min": 281,
            "temp_max": 285,
            "pressure": 1012,
            "humidity": 60
        },
        "wind": {"speed": 3, "deg": 180},
        "dt": 1700000000,
        "sys": {"country": "GB"},
        "name": "London",
        "cod": 200
    })
}

fn client_for(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new("TEST_KEY".into(), server.uri(), Duration::from_secs(5))
        .expect("Failed to create client")
}

async fn mount(server: &MockServer, city: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", city))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// Provider
// ============================================================================

#[tokio::test]
async fn current_weather_success() {
    let server = MockServer::start().await;
    mount(&server, "London", ResponseTemplate::new(200).set_body_json(london_body())).await;

    let result = client_for(&server).current_weather("London").await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");

    let snap = result.unwrap();
    assert_eq!(snap.name, "London");
    assert!((snap.main.temp - 283.15).abs() < 1e-9);
    assert_eq!(snap.condition().map(|c| c.description.as_str()), Some("clear sky"));
}

#[tokio::test]
async fn city_is_url_encoded() {
    let server = MockServer::start().await;
    mount(&server, "São Paulo & Co", ResponseTemplate::new(200).set_body_json(london_body()))
        .await;

    let result = client_for(&server).current_weather("São Paulo & Co").await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");
}

#[tokio::test]
async fn not_found_is_status_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "Atlantis",
        ResponseTemplate::new(404)
            .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
    )
    .await;

    let result = client_for(&server).current_weather("Atlantis").await;
    assert!(
        matches!(result, Err(FetchError::Status { status: 404, .. })),
        "Expected Status(404), got: {result:?}"
    );
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    mount(&server, "London", ResponseTemplate::new(200).set_body_string("not valid json")).await;

    let result = client_for(&server).current_weather("London").await;
    assert!(
        matches!(result, Err(FetchError::Decode(_))),
        "Expected Decode, got: {result:?}"
    );
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let client = OpenWeatherProvider::new(
        "TEST_KEY".into(),
        "http://127.0.0.1:1".into(),
        Duration::from_secs(2),
    )
    .expect("Failed to create client");

    let result = client.current_weather("London").await;
    let err = result.expect_err("connection must fail");

    assert!(matches!(err, FetchError::Transport(_)), "Expected Transport, got: {err:?}");
    assert!(!err.to_string().contains("TEST_KEY"), "API key leaked: {err}");
}

// ============================================================================
// Widget end to end
// ============================================================================

fn fast_widget(server: &MockServer) -> WeatherWidget {
    let options = WidgetOptions { debounce: Duration::from_millis(50), ..Default::default() };
    WeatherWidget::new(Arc::new(client_for(server)), options)
}

#[tokio::test]
async fn widget_renders_london_and_toggles() {
    let server = MockServer::start().await;
    mount(&server, "London", ResponseTemplate::new(200).set_body_json(london_body())).await;

    let mut widget = fast_widget(&server);
    let mut rx = widget.subscribe();

    widget.set_city("London");
    rx.wait_for(|s| s.snapshot.is_some() && !s.loading).await.unwrap();

    let text = widget.view().to_string();
    assert!(text.contains("London, GB"));
    assert!(text.contains("Current Temperature: 10.00 °C"));
    assert!(text.contains("Icon: https://openweathermap.org/img/w/01d.png"));

    widget.toggle_unit();
    assert_eq!(widget.state().unit, TemperatureUnit::Fahrenheit);
    assert!(widget.view().to_string().contains("Current Temperature: 50.00 °F"));
}

#[tokio::test]
async fn widget_shows_generic_message_on_404() {
    let server = MockServer::start().await;
    mount(&server, "Atlantis", ResponseTemplate::new(404)).await;

    let mut widget = fast_widget(&server);
    let mut rx = widget.subscribe();

    widget.set_city("Atlantis");
    rx.wait_for(|s| s.error.is_some() && !s.loading).await.unwrap();

    let view = widget.view();
    assert_eq!(view.error.as_deref(), Some(FETCH_ERROR_MESSAGE));
    assert!(view.panel.is_none());
}

#[tokio::test]
async fn widget_sends_one_request_for_burst_of_edits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut widget = fast_widget(&server);
    let mut rx = widget.subscribe();

    for partial in ["L", "Lo", "Lon", "Lond", "Londo", "London"] {
        widget.set_city(partial);
    }
    rx.wait_for(|s| s.snapshot.is_some() && !s.loading).await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    server.verify().await;
}
