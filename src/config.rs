use crate::error::{AppError, Result};

pub const TSETMC_API_URL: &str = "https://cdn.tsetmc.com";

/// Path of the option market watch endpoint; the market number is appended.
pub const MARKET_WATCH_PATH: &str = "/api/Instrument/GetInstrumentOptionMarketWatch";

/// Top-level key of the market watch response holding the record array.
pub const MARKET_WATCH_FIELD: &str = "instrumentOptMarketWatch";

pub const OUTPUT_PATH: &str = "TSETMC_sample_data.csv";

/// Per-request timeout (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum number of market fetches in flight at once.
pub const FETCH_CONCURRENCY: usize = 2;

/// Raw → canonical names of the fields shared by both legs of a contract.
pub const GENERAL_FIELDS: &[(&str, &str)] = &[
    ("uaInsCode", "ua_tse_code"),
    ("lval30_UA", "ua_ticker"),
    ("remainedDay", "days_to_maturity"),
    ("strikePrice", "strike_price"),
    ("contractSize", "contract_size"),
    ("pClosing_UA", "ua_close_price"),
    ("priceYesterday_UA", "ua_yesterday_price"),
    ("beginDate", "begin_date"),
    ("endDate", "end_date"),
];

/// Base → canonical names of the per-leg fields. The raw key carries a `_C`
/// (call) or `_P` (put) suffix.
pub const SPECIFIC_FIELDS: &[(&str, &str)] = &[
    ("insCode", "tse_code"),
    ("lVal18AFC", "ticker"),
    ("zTotTran", "trades_num"),
    ("qTotTran5J", "trades_volume"),
    ("qTotCap", "trades_value"),
    ("pDrCotVal", "last_price"),
    ("pClosing", "close_price"),
    ("priceYesterday", "yesterday_price"),
    ("oP", "open_positions"),
    ("yesterdayOP", "yesterday_open_positions"),
    ("notionalValue", "notional_value"),
    ("pMeDem", "bid_price"),
    ("qTitMeDem", "bid_volume"),
    ("pMeOf", "ask_price"),
    ("qTitMeOf", "ask_volume"),
    ("lVal30", "name"),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub output_path: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                AppError::Config("REQUEST_TIMEOUT_SECS must be a positive integer".to_string())
            })?;

        Ok(Self {
            api_url: std::env::var("TSETMC_API_URL")
                .unwrap_or_else(|_| TSETMC_API_URL.to_string()),
            output_path: std::env::var("OUTPUT_PATH").unwrap_or_else(|_| OUTPUT_PATH.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            request_timeout_secs,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: TSETMC_API_URL.to_string(),
            output_path: OUTPUT_PATH.to_string(),
            log_level: "info".to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}
