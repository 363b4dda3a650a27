use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::OptionFetcher;
use crate::reshape::{reshape, FieldLayout};
use crate::types::OptionTable;
use crate::user_agent::UserAgentSource;
use crate::writer::write_csv;

/// Fetch both markets and reshape the combined records into call/put rows.
pub async fn fetch_cleaned_market_data(fetcher: &OptionFetcher) -> OptionTable {
    info!("Fetching entire market data.");
    let (records, report) = fetcher.fetch_all_with_report().await;

    if report.has_failures() {
        for (market, err) in &report.failed {
            warn!(market = %market, "Market {market} is missing from the output: {err}");
        }
    }

    info!("Cleaning fetched market data.");
    let table = reshape(&records, &FieldLayout::default());
    info!(rows = table.len(), "Data fetched and cleaned successfully.");
    table
}

/// Top-level run: any error is logged with full context and the call returns
/// normally.
pub async fn execute(cfg: &Config, user_agent: UserAgentSource) {
    info!("Script started.");
    if let Err(e) = run_with_user_agent(cfg, user_agent).await {
        error!("An unexpected error occurred: {e:?}");
    }
}

/// Fetch, reshape, write the CSV and log the first row.
pub async fn run_with_user_agent(cfg: &Config, user_agent: UserAgentSource) -> Result<OptionTable> {
    let fetcher = OptionFetcher::new(cfg, user_agent)?;
    let table = fetch_cleaned_market_data(&fetcher).await;

    write_csv(&table, &cfg.output_path)?;

    match first_record_line(&table) {
        Some(first) => info!("First record: {first}"),
        None => warn!("No option rows were produced; {} is empty", cfg.output_path),
    }
    Ok(table)
}

/// First row rendered as a JSON object, for the completion log line.
pub fn first_record_line(table: &OptionTable) -> Option<String> {
    table.record(0).map(|first| Value::Object(first).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MARKET_WATCH_FIELD, MARKET_WATCH_PATH};
    use crate::user_agent::fixed_source;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn market_record(ua: &str, call: &str, put: &str) -> Value {
        json!({
            "uaInsCode": ua,
            "lval30_UA": "اهرم",
            "strikePrice": 2400,
            "contractSize": 1000,
            "remainedDay": 35,
            "insCode_C": call,
            "lVal18AFC_C": "ضهرم1234",
            "pClosing_C": 310,
            "pMeDem_C": 305,
            "insCode_P": put,
            "lVal18AFC_P": "طهرم1234",
            "pClosing_P": 120,
            "pMeDem_P": 118,
        })
    }

    #[tokio::test]
    async fn end_to_end_writes_two_rows_per_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{MARKET_WATCH_PATH}/1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                MARKET_WATCH_FIELD: [
                    market_record("ua1", "c1", "p1"),
                    market_record("ua2", "c2", "p2"),
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{MARKET_WATCH_PATH}/2")))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("options.csv");
        let cfg = Config {
            api_url: server.uri(),
            output_path: output.to_string_lossy().into_owned(),
            ..Config::default()
        };

        let table = run_with_user_agent(&cfg, fixed_source("test-agent/1.0"))
            .await
            .unwrap();
        assert_eq!(table.len(), 4);

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(
            headers,
            vec![
                "ua_tse_code",
                "ua_ticker",
                "days_to_maturity",
                "strike_price",
                "contract_size",
                "tse_code",
                "ticker",
                "close_price",
                "bid_price",
                "option_type",
            ]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        let column = |name: &str| headers.iter().position(|h| h == name).unwrap();

        let codes: Vec<&str> = rows.iter().map(|r| &r[column("tse_code")]).collect();
        assert_eq!(codes, vec!["c1", "c2", "p1", "p2"]);
        let types: Vec<&str> = rows.iter().map(|r| &r[column("option_type")]).collect();
        assert_eq!(types, vec!["call", "call", "put", "put"]);
        assert_eq!(&rows[0][column("close_price")], "310");
        assert_eq!(&rows[3][column("bid_price")], "118");
        assert_eq!(&rows[2][column("ua_tse_code")], "ua1");
        assert_eq!(&rows[1][column("ua_ticker")], "اهرم");
    }

    #[test]
    fn first_record_line_renders_json_object() {
        let table = OptionTable {
            columns: vec!["tse_code".into(), "close_price".into(), "option_type".into()],
            rows: vec![
                vec![json!("c1"), json!(100), json!("call")],
                vec![json!("p1"), json!(50), json!("put")],
            ],
        };
        assert_eq!(
            first_record_line(&table).as_deref(),
            Some(r#"{"tse_code":"c1","close_price":100,"option_type":"call"}"#)
        );
        assert_eq!(first_record_line(&OptionTable::default()), None);
    }

    #[tokio::test]
    async fn execute_absorbs_top_level_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                MARKET_WATCH_FIELD: [market_record("ua1", "c1", "p1")]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("options.csv");
        let cfg = Config {
            api_url: server.uri(),
            output_path: output.to_string_lossy().into_owned(),
            ..Config::default()
        };

        assert!(run_with_user_agent(&cfg, fixed_source("test-agent/1.0")).await.is_err());
        execute(&cfg, fixed_source("test-agent/1.0")).await;
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn total_failure_still_writes_empty_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("options.csv");
        let cfg = Config {
            api_url: server.uri(),
            output_path: output.to_string_lossy().into_owned(),
            ..Config::default()
        };

        let table = run_with_user_agent(&cfg, fixed_source("test-agent/1.0"))
            .await
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    }
}
