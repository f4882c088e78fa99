use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use super::{PriceKeys, QuoteSource};
use crate::error::UpstreamFetchError;

/// Batches and deduplicates price lookups in front of a [`QuoteSource`].
pub struct PriceFetcher {
    source: Arc<dyn QuoteSource>,
}

impl PriceFetcher {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self { source }
    }

    /// USD price per key, one request for all distinct keys.
    ///
    /// An empty key set returns an empty map without touching the network.
    pub async fn fetch_prices<I, S>(
        &self,
        keys: I,
    ) -> Result<HashMap<String, Decimal>, UpstreamFetchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: PriceKeys = keys.into_iter().collect();
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        debug!(source = self.source.name(), keys = %keys.join(","), "fetching quotes");
        let prices = self.source.fetch_usd_quotes(&keys).await?;

        let missing: Vec<&str> = keys.iter().filter(|k| !prices.contains_key(*k)).collect();
        if !missing.is_empty() {
            debug!(source = self.source.name(), ?missing, "quotes missing from response");
        }

        Ok(prices)
    }

    /// Single-asset quote. `Ok(None)` when the service has no price for `key`.
    pub async fn fetch_price(&self, key: &str) -> Result<Option<Decimal>, UpstreamFetchError> {
        let mut prices = self.fetch_prices([key]).await?;
        Ok(prices.remove(key.trim()))
    }
}
