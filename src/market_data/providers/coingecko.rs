//! CoinGecko quote source.
//!
//! Uses the free `/simple/price` endpoint, which takes a comma-separated list
//! of coin ids and returns `{"<id>": {"usd": <price>}}`. Every key in a batch
//! goes into a single request.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::UpstreamFetchError;
use crate::market_data::{PriceKeys, QuoteSource};

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

const SERVICE: &str = "coingecko";

const USER_AGENT: &str = concat!("walletfolio/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: f64,
}

type SimplePriceResponse = HashMap<String, UsdQuote>;

/// CoinGecko `/simple/price` client.
///
/// No API key is required, though the free tier is rate limited.
pub struct CoinGeckoQuoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoQuoteSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: COINGECKO_API_BASE.to_string(),
        }
    }

    /// Point at a different API root, e.g. a mock server or the pro API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn quotes_to_decimal(response: SimplePriceResponse) -> HashMap<String, Decimal> {
    response
        .into_iter()
        .filter_map(|(key, quote)| {
            // f64 Display never uses an exponent, so this round-trips the
            // value as printed by the service.
            match Decimal::from_str(&quote.usd.to_string()) {
                Ok(price) => Some((key, price)),
                Err(err) => {
                    debug!(key = %key, usd = quote.usd, error = %err, "dropping unrepresentable quote");
                    None
                }
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl QuoteSource for CoinGeckoQuoteSource {
    async fn fetch_usd_quotes(
        &self,
        keys: &PriceKeys,
    ) -> Result<HashMap<String, Decimal>, UpstreamFetchError> {
        let url = format!("{}/simple/price", self.base_url);
        let ids = keys.join(",");

        let response = self
            .client
            .get(&url)
            .query(&[("ids", ids.as_str()), ("vs_currencies", "usd")])
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|source| UpstreamFetchError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamFetchError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| UpstreamFetchError::Transport {
                service: SERVICE,
                source,
            })?;

        let data: SimplePriceResponse =
            serde_json::from_slice(&bytes).map_err(|source| UpstreamFetchError::Decode {
                service: SERVICE,
                source,
            })?;

        Ok(quotes_to_decimal(data))
    }

    fn name(&self) -> &str {
        SERVICE
    }
}
