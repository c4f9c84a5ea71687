//! Integration tests for `FeedClient` using wiremock HTTP mocks.

use fuel_server::domain::FuelKind;
use fuel_server::feed::{FeedClient, FeedClientConfig, FeedError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> FeedClient {
    FeedClient::new(FeedClientConfig::new().with_url(format!("{base_url}/feed")))
        .expect("client construction should not fail")
}

#[tokio::test]
async fn fetch_returns_parsed_feed() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "Fecha": "16/10/2026 9:12:40",
        "ListaEESSPrecio": [
            {
                "IDEESS": "4375",
                "Rótulo": "BP LA MORALEJA",
                "Dirección": "AVENIDA EUROPA, 12",
                "Municipio": "Alcobendas",
                "Provincia": "MADRID",
                "Latitud": "40,526389",
                "Longitud (WGS84)": "-3,640917",
                "Horario": "L-D: 06:00-23:00",
                "Precio Gasoleo A": "1,459",
                "Precio Gasolina 95 E5": ""
            },
            "not a station"
        ],
        "ResultadoConsulta": "OK"
    });

    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(header("cache-control", "no-store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let feed = client.fetch().await.expect("should parse feed");

    assert_eq!(feed.published_at.as_deref(), Some("16/10/2026 9:12:40"));
    assert_eq!(feed.result.as_deref(), Some("OK"));
    assert_eq!(feed.stations.len(), 1);

    let station = &feed.stations[0];
    assert_eq!(station.label.as_deref(), Some("BP LA MORALEJA"));
    assert_eq!(station.longitude(), Some("-3,640917"));
    assert_eq!(station.price(FuelKind::DieselA), Some("1,459"));
    assert_eq!(station.price(FuelKind::Gasoline95E5), Some(""));
}

#[tokio::test]
async fn server_error_is_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).fetch().await.unwrap_err();

    match err {
        FeedError::Fetch { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("Internal Server Error"));
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).fetch().await.unwrap_err();

    match err {
        FeedError::Parse { body, .. } => {
            assert_eq!(body.as_deref(), Some("<html>maintenance</html>"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_station_list_is_schema_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ResultadoConsulta": "OK" })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).fetch().await.unwrap_err();
    assert!(matches!(err, FeedError::Schema(_)), "got {err:?}");
}
