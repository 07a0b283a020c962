use fxconv::Converter;
use fxconv::core::config::AppConfig;
use fxconv::core::{ConversionError, ErrorKind};
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const DAILY_RESPONSE: &str = r#"{
        "Date": "2024-05-17T11:30:00+03:00",
        "Valute": {
            "USD": {"CharCode": "USD", "Nominal": 1, "Name": "Доллар США", "Value": 90.0, "Previous": 91.2},
            "EUR": {"CharCode": "EUR", "Nominal": 1, "Name": "Евро", "Value": 100.0, "Previous": 98.6},
            "KZT": {"CharCode": "KZT", "Nominal": 100, "Name": "Казахстанских тенге", "Value": 20.0, "Previous": 20.6}
        }
    }"#;

    /// Serves the daily feed and expects exactly `calls` requests.
    pub async fn create_mock_server(status: u16, body: &str, calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/daily_json.js"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(calls)
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn config_yaml(server: &MockServer, extra: &str) -> String {
        format!(
            "upstream_url: \"{}/daily_json.js\"\nrequest_timeout_seconds: 2\n{}",
            server.uri(),
            extra
        )
    }
}

fn load_config(content: &str) -> AppConfig {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(config_file.path(), content).expect("Failed to write config file");
    AppConfig::load_from_path(config_file.path()).expect("Failed to load config")
}

#[test_log::test(tokio::test)]
async fn test_full_conversion_flow_with_mock() {
    let mock_server = test_utils::create_mock_server(200, test_utils::DAILY_RESPONSE, 1).await;
    let config = load_config(&test_utils::config_yaml(&mock_server, ""));
    let converter = Converter::from_config(&config).expect("Failed to build converter");

    let result = converter.convert("USD", "EUR", 10.0).await.unwrap();
    info!(?result, "USD to EUR");
    assert!((result - 9.0).abs() < 1e-9);

    assert_eq!(converter.convert("USD", "RUB", 100.0).await.unwrap(), 9000.0);
    assert!((converter.convert("KZT", "RUB", 1000.0).await.unwrap() - 200.0).abs() < 1e-9);
    // Unknown codes are priced like the reference currency.
    assert_eq!(converter.convert("USD", "XXX", 1.0).await.unwrap(), 90.0);

    let currencies = converter.list_currencies().await.unwrap();
    let labels: Vec<&str> = currencies.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "EUR - Евро",
            "KZT - Казахстанских тенге",
            "RUB - Российский рубль",
            "USD - Доллар США",
        ]
    );
    converter.list_currencies().await.unwrap();

    // The currency list is derived from the cached rates: one upstream request in total.
    mock_server.verify().await;
}

#[test_log::test(tokio::test)]
async fn test_negative_value_does_not_reach_upstream() {
    let mock_server = test_utils::create_mock_server(200, test_utils::DAILY_RESPONSE, 0).await;
    let config = load_config(&test_utils::config_yaml(&mock_server, ""));
    let converter = Converter::from_config(&config).unwrap();

    let value = Converter::parse_value("-100").unwrap();
    let err = converter.convert("USD", "RUB", value).await.unwrap_err();
    assert!(matches!(err, ConversionError::NegativeValue(_)));
    assert_eq!(err.to_string(), "Value cannot be negative: -100");

    mock_server.verify().await;
}

#[test_log::test(tokio::test)]
async fn test_upstream_outage_surfaces_as_service_error() {
    let mock_server = test_utils::create_mock_server(503, "", 2).await;
    let config = load_config(&test_utils::config_yaml(&mock_server, ""));
    let converter = Converter::from_config(&config).unwrap();

    for _ in 0..2 {
        let err = converter.convert("USD", "EUR", 1.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service);
        assert!(err.to_string().starts_with("HTTP error: 503"));
    }

    mock_server.verify().await;
}

#[test_log::test(tokio::test)]
async fn test_strict_mode_from_config() {
    let mock_server = test_utils::create_mock_server(200, test_utils::DAILY_RESPONSE, 1).await;
    let config = load_config(&test_utils::config_yaml(
        &mock_server,
        "strict_currencies: true\ncacheTTLSeconds: 60\n",
    ));
    assert_eq!(config.cache_ttl_seconds, 60);
    let converter = Converter::from_config(&config).unwrap();

    let err = converter.convert("USD", "XXX", 1.0).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
    assert_eq!(err.to_string(), "Unknown currency: XXX");
    assert_eq!(converter.convert("EUR", "RUB", 2.0).await.unwrap(), 200.0);
}

#[test_log::test(tokio::test)]
async fn test_huge_amount_is_rejected_not_infinite() {
    let mock_server = test_utils::create_mock_server(200, test_utils::DAILY_RESPONSE, 1).await;
    let config = load_config(&test_utils::config_yaml(&mock_server, ""));
    let converter = Converter::from_config(&config).unwrap();

    let err = converter.convert("USD", "RUB", 1e307).await.unwrap_err();
    assert!(matches!(err, ConversionError::ValueTooLarge(_)));
    assert_eq!(err.kind(), ErrorKind::Client);
}
