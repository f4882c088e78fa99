use std::collections::HashMap;

use rust_decimal::Decimal;

use super::PriceKeys;
use crate::error::UpstreamFetchError;

/// Current USD quotes for a batch of price-lookup keys.
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    /// One request for the whole batch. Keys the service does not know are
    /// absent from the returned map.
    async fn fetch_usd_quotes(
        &self,
        keys: &PriceKeys,
    ) -> Result<HashMap<String, Decimal>, UpstreamFetchError>;

    fn name(&self) -> &str;
}
