use chrono::NaiveDate;
use portrisk::core::AnalysisError;
use std::fs;
use tracing::{error, info};

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serves the same chart document for both resolve and close requests.
    pub async fn mount_chart(server: &MockServer, symbol: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mount_not_found(server: &MockServer, symbol: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
            ))
            .mount(server)
            .await;
    }

    /// Daily bars at 14:30 UTC starting 2024-01-02 (a Tuesday), one per close.
    pub fn chart_body(closes: &[Option<f64>]) -> String {
        let first = 1_704_205_800_i64;
        let timestamps: Vec<String> = (0..closes.len())
            .map(|i| (first + i as i64 * 86_400).to_string())
            .collect();
        let closes: Vec<String> = closes
            .iter()
            .map(|c| c.map_or("null".to_string(), |v| v.to_string()))
            .collect();
        format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "meta": {{ "currency": "USD", "gmtoffset": -18000 }},
                        "timestamp": [{}],
                        "indicators": {{ "quote": [{{ "close": [{}] }}] }}
                    }}],
                    "error": null
                }}
            }}"#,
            timestamps.join(","),
            closes.join(",")
        )
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str, body: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let content = format!(
            r#"
portfolio:
{body}
providers:
  yahoo:
    base_url: {base_url}
    retries: 0
"#
        );
        std::fs::write(&config_path, content).expect("Failed to write config file");
        config_path
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_chart(
        &mock_server,
        "AAPL",
        test_utils::chart_body(&[Some(100.0), Some(101.0), Some(98.98), Some(101.9494)]),
    )
    .await;
    test_utils::mount_chart(
        &mock_server,
        "MSFT",
        test_utils::chart_body(&[Some(50.0), Some(51.0), Some(51.51), Some(50.9949)]),
    )
    .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let export_dir = temp_dir.path().join("out");
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &mock_server.uri(),
        r#"  instruments: ["AAPL", "MSFT"]
  weights: [0.5, 0.5]
  start_date: 2024-01-01
  end_date: 2024-02-01"#,
    );

    let result = portrisk::run_command(
        portrisk::AppCommand::Analyze {
            export_dir: Some(export_dir.to_string_lossy().into_owned()),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );

    let prices = fs::read_to_string(export_dir.join("prices.csv")).unwrap();
    let mut lines = prices.lines();
    assert_eq!(lines.next(), Some("Date,AAPL,MSFT"));
    assert_eq!(lines.next(), Some("2024-01-02,100,50"));
    assert_eq!(prices.lines().count(), 5);

    let returns = fs::read_to_string(export_dir.join("daily_returns.csv")).unwrap();
    assert_eq!(returns.lines().count(), 4);
    assert!(returns.lines().nth(1).unwrap().starts_with("2024-01-03,"));
}

#[test_log::test(tokio::test)]
async fn test_calendar_gap_drops_whole_return_row() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_chart(
        &mock_server,
        "AAPL",
        test_utils::chart_body(&[Some(10.0), Some(11.0), Some(12.0), Some(13.0), Some(14.0)]),
    )
    .await;
    // MSFT has no close on 2024-01-04.
    test_utils::mount_chart(
        &mock_server,
        "MSFT",
        test_utils::chart_body(&[Some(20.0), Some(21.0), None, Some(22.0), Some(23.0)]),
    )
    .await;

    let temp_dir = tempfile::TempDir::new().unwrap();
    let export_dir = temp_dir.path().join("out");
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &mock_server.uri(),
        r#"  instruments: ["AAPL", "MSFT"]
  weights: [0.7, 0.3]
  start_date: 2024-01-01
  end_date: 2024-02-01"#,
    );

    portrisk::run_command(
        portrisk::AppCommand::Analyze {
            export_dir: Some(export_dir.to_string_lossy().into_owned()),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .expect("analysis should succeed");

    let prices = fs::read_to_string(export_dir.join("prices.csv")).unwrap();
    assert!(prices.contains("2024-01-04,12,\n"));

    // Rows ending on 01-04 and 01-05 both touch the gap.
    let returns = fs::read_to_string(export_dir.join("daily_returns.csv")).unwrap();
    let dates: Vec<&str> = returns
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-03", "2024-01-06"]);
}

#[test_log::test(tokio::test)]
async fn test_unknown_instrument_fails_validation() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_chart(
        &mock_server,
        "AAPL",
        test_utils::chart_body(&[Some(100.0), Some(101.0), Some(102.0)]),
    )
    .await;
    test_utils::mount_not_found(&mock_server, "NOPE").await;

    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &mock_server.uri(),
        r#"  instruments: ["AAPL", "NOPE"]
  weights: [0.5, 0.5]
  start_date: 2024-01-01
  end_date: 2024-02-01"#,
    );

    let err = portrisk::run_command(
        portrisk::AppCommand::Analyze { export_dir: None },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<AnalysisError>(),
        Some(&AnalysisError::UnknownInstrument("NOPE".to_string()))
    );
}

#[test_log::test(tokio::test)]
async fn test_future_end_date_is_rejected() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_chart(
        &mock_server,
        "AAPL",
        test_utils::chart_body(&[Some(100.0), Some(101.0), Some(102.0)]),
    )
    .await;

    let today = chrono::Local::now().date_naive();
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &mock_server.uri(),
        &format!(
            r#"  instruments: ["AAPL"]
  weights: [1.0]
  start_date: 2024-01-01
  end_date: {today}"#
        ),
    );

    let err = portrisk::run_command(
        portrisk::AppCommand::Analyze { export_dir: None },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::EndDateNotInPast { .. })
    ));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file() {
    let result = portrisk::run_command(
        portrisk::AppCommand::Analyze { export_dir: None },
        Some("/nonexistent/portrisk.yaml"),
    )
    .await;
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}

#[test_log::test(tokio::test)]
#[ignore = "requires network access"]
async fn test_real_yahoo_finance_api() {
    use portrisk::core::PriceSource;
    use portrisk::providers::yahoo_finance::YahooFinanceProvider;

    let provider = YahooFinanceProvider::new("https://query1.finance.yahoo.com");
    let symbol = "AAPL";
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    info!(?symbol, "Fetching closes from Yahoo Finance");

    assert!(provider.resolve(symbol).await.unwrap());
    match provider.fetch_closes(symbol, start, end).await {
        Ok(closes) => {
            info!(count = closes.len(), "Received closes");
            assert!(!closes.is_empty(), "Closes should not be empty");
            assert!(closes.iter().all(|c| c.date >= start && c.date < end));
            assert!(closes.iter().all(|c| c.close > 0.0));
        }
        Err(e) => {
            error!("API request failed: {e}\n{e:?}");
            panic!("API request failed: {e}");
        }
    }
}
