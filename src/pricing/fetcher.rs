use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::history::{self, latest_quote_from_history, parse_dividend_date, parse_history};
use super::profile::parse_fund_profile;
use super::{fetch_jsonp, fetch_scraped_content, fetch_text, HttpTransport, InFlightRegistry, OfflineTransport, Transport};
use crate::config::{render_url, Config};
use crate::db::{FundProfile, FundQuote, HistoryPoint, QuoteSource};
use crate::error::FundError;
use crate::reports::chart::ChartRange;
use crate::utils::validate_code;

const JSONP_CALLBACK: &str = "jsonpgz";
const FALLBACK_DAYS: i64 = 7;
const FALLBACK_ROWS: u32 = 10;
const CHART_ROWS: u32 = 365;

/// Payload of the live estimate feed; every field arrives as a string.
#[derive(Debug, Deserialize)]
struct LiveQuotePayload {
    fundcode: Option<String>,
    name: Option<String>,
    /// NAV date
    jzrq: Option<String>,
    /// NAV
    dwjz: Option<String>,
    /// intraday estimate
    gsz: Option<String>,
    /// estimated growth, percent
    gszzl: Option<String>,
    gztime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceDividend {
    #[serde(default)]
    success: bool,
    #[serde(rename = "dividendDate")]
    dividend_date: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceName {
    name: Option<String>,
}

/// Everything the search view shows for one fund
#[derive(Debug, Clone, Serialize)]
pub struct FundSearch {
    pub quote: FundQuote,
    pub range: ChartRange,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub series: Vec<HistoryPoint>,
    pub period_growth_pct: Option<Decimal>,
    pub profile: Option<FundProfile>,
}

/// Fund data client. Cheap to clone; clones share the transport and the
/// in-flight registry.
#[derive(Clone)]
pub struct FundFetcher {
    transport: Arc<dyn Transport>,
    config: Arc<Config>,
    in_flight: InFlightRegistry,
}

impl FundFetcher {
    pub fn new(transport: Arc<dyn Transport>, config: Config) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            in_flight: InFlightRegistry::new(),
        }
    }

    /// Pick the HTTP or offline transport according to `config.offline`.
    pub fn from_config(config: Config) -> Result<Self, FundError> {
        let transport: Arc<dyn Transport> = if config.offline {
            info!("Offline mode: network requests are disabled");
            Arc::new(OfflineTransport)
        } else {
            Arc::new(HttpTransport::new()?)
        };
        Ok(Self::new(transport, config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Quote from the live estimate feed.
    pub async fn fetch_live_quote(&self, code: &str) -> Result<FundQuote, FundError> {
        let url = render_url(&self.config.quote_url, &[("code", code)]);
        let payload: LiveQuotePayload = fetch_jsonp(
            self.transport.as_ref(),
            &self.in_flight,
            &url,
            JSONP_CALLBACK,
            self.config.quote_timeout(),
        )
        .await?;

        let fund_code = payload
            .fundcode
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| FundError::EmptyData(format!("live feed returned no data for {}", code)))?;

        let net_value = parse_decimal(payload.dwjz.as_deref())
            .ok_or_else(|| FundError::EmptyData(format!("live feed returned no NAV for {}", code)))?;

        Ok(FundQuote {
            code: fund_code,
            name: payload
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| default_name(code)),
            net_value,
            net_value_date: payload
                .jzrq
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            day_growth_pct: parse_decimal(payload.gszzl.as_deref()),
            estimated_value: parse_decimal(payload.gsz.as_deref()),
            estimated_time: payload.gztime.filter(|t| !t.trim().is_empty()),
            source: QuoteSource::Live,
        })
    }

    /// NAV rows between `start` and `end`, ascending. May be empty.
    pub async fn fetch_history(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        rows: u32,
        timeout: std::time::Duration,
    ) -> Result<Vec<HistoryPoint>, FundError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        let rows = rows.to_string();
        let url = render_url(
            &self.config.history_url,
            &[("code", code), ("start", &start), ("end", &end), ("per", &rows)],
        );
        let content =
            fetch_scraped_content(self.transport.as_ref(), &self.in_flight, &url, timeout).await?;
        Ok(parse_history(&content))
    }

    /// Quote derived from the last week of NAV history.
    pub async fn fetch_quote_from_history(&self, code: &str) -> Result<FundQuote, FundError> {
        let today = Local::now().date_naive();
        let start = today - ChronoDuration::days(FALLBACK_DAYS);
        let points = match self
            .fetch_history(code, start, today, FALLBACK_ROWS, self.config.fallback_timeout())
            .await
        {
            Ok(points) => points,
            Err(FundError::EmptyData(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        if points.is_empty() {
            return Err(FundError::NotFound(format!(
                "no NAV data for {}, check the fund code",
                code
            )));
        }

        let name = self
            .fetch_fund_name(code)
            .await
            .unwrap_or_else(|| default_name(code));

        latest_quote_from_history(code, &name, &points)
            .ok_or_else(|| FundError::NotFound(format!("no NAV data for {}", code)))
    }

    /// Live quote, falling back to the history-derived quote.
    pub async fn fetch_quote(&self, code: &str) -> Result<FundQuote, FundError> {
        match self.fetch_live_quote(code).await {
            Ok(quote) => Ok(quote),
            Err(e) => {
                debug!("Live quote for {} unavailable ({}), trying history", code, e);
                self.fetch_quote_from_history(code).await
            }
        }
    }

    /// Fund name from the optional service. `None` when the service is not
    /// configured or does not know the fund.
    pub async fn fetch_fund_name(&self, code: &str) -> Option<String> {
        let base = self.config.service_url.as_deref()?;
        let url = format!("{}/api/fundname/{}", base, code);
        let body = match fetch_text(
            self.transport.as_ref(),
            &self.in_flight,
            &url,
            self.config.quote_timeout(),
        )
        .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch fund name for {}: {}", code, e);
                return None;
            }
        };

        match serde_json::from_str::<ServiceName>(&body) {
            Ok(payload) => payload.name.filter(|n| !n.trim().is_empty()),
            Err(e) => {
                warn!("Invalid fund name response for {}: {}", code, e);
                None
            }
        }
    }

    /// One dividend lookup attempt. `Ok(None)` means the fund never paid.
    pub async fn fetch_dividend_date_once(&self, code: &str) -> Result<Option<NaiveDate>, FundError> {
        let timeout = self.config.dividend_timeout();

        if let Some(base) = self.config.service_url.as_deref() {
            let url = format!("{}/api/fund/dividend/{}", base, code);
            let body = fetch_text(self.transport.as_ref(), &self.in_flight, &url, timeout).await?;
            let payload: ServiceDividend = serde_json::from_str(&body)
                .map_err(|e| FundError::EmptyData(format!("invalid dividend response: {}", e)))?;
            if !payload.success {
                return Err(FundError::Network(
                    payload.error.unwrap_or_else(|| "dividend service error".to_string()),
                ));
            }
            return Ok(payload
                .dividend_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()));
        }

        let url = render_url(&self.config.dividend_url, &[("code", code)]);
        match fetch_scraped_content(self.transport.as_ref(), &self.in_flight, &url, timeout).await {
            Ok(content) => Ok(parse_dividend_date(&content)),
            Err(FundError::EmptyData(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Dividend date with bounded retry and linear backoff. Exhausted
    /// retries degrade to `None`.
    pub async fn fetch_dividend_date(&self, code: &str) -> Option<NaiveDate> {
        let attempts = self.config.dividend_retries.max(1);
        for attempt in 1..=attempts {
            match self.fetch_dividend_date_once(code).await {
                Ok(date) => return date,
                Err(e) => {
                    warn!(
                        "Dividend lookup for {} failed (attempt {}/{}): {}",
                        code, attempt, attempts, e
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_delay() * attempt).await;
                    }
                }
            }
        }
        None
    }

    /// Manager, company, size and inception date from the profile page.
    pub async fn fetch_profile(&self, code: &str) -> Result<FundProfile, FundError> {
        let url = render_url(&self.config.profile_url, &[("code", code)]);
        let html = fetch_text(
            self.transport.as_ref(),
            &self.in_flight,
            &url,
            self.config.history_timeout(),
        )
        .await?;
        Ok(parse_fund_profile(&html))
    }

    /// NAV series for `range`, ending `today`.
    pub async fn fetch_chart(
        &self,
        code: &str,
        range: ChartRange,
        today: NaiveDate,
    ) -> Result<Vec<HistoryPoint>, FundError> {
        let (start, end) = range.window(today);
        let points = self
            .fetch_history(code, start, end, CHART_ROWS, self.config.history_timeout())
            .await?;
        if points.is_empty() {
            return Err(FundError::EmptyData(format!(
                "no NAV history for {} between {} and {}",
                code, start, end
            )));
        }
        Ok(points)
    }

    /// Validate the code, load the quote (live, else history) and the chart
    /// series. Chart and profile failures are not fatal.
    pub async fn search_fund(&self, code: &str, range: ChartRange) -> Result<FundSearch, FundError> {
        let code = code.trim();
        validate_code(code)?;

        info!("Searching fund {}", code);
        let quote = self.fetch_quote(code).await?;

        let today = Local::now().date_naive();
        let (start_date, end_date) = range.window(today);
        let (chart, profile) = tokio::join!(
            self.fetch_chart(code, range, today),
            self.fetch_profile(code)
        );

        let series = chart.unwrap_or_else(|e| {
            warn!("Failed to load chart for {}: {}", code, e);
            Vec::new()
        });
        let profile = match profile {
            Ok(profile) => Some(profile),
            Err(e) => {
                debug!("Profile for {} unavailable: {}", code, e);
                None
            }
        };

        Ok(FundSearch {
            period_growth_pct: history::period_growth(&series),
            quote,
            range,
            start_date,
            end_date,
            series,
            profile,
        })
    }
}

/// Display name used when no feed knows the fund's name
pub fn default_name(code: &str) -> String {
    format!("基金{}", code)
}

fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    value.and_then(|v| Decimal::from_str(v.trim()).ok())
}
