use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::compose::compose_valuation;
use super::observer::{AggregationObserver, FetchStage, TracingObserver};
use crate::chain::{
    AssetBalanceFetcher, ChainSource, DiscoveredHoldings, NativeBalanceFetcher, SolanaRpcClient,
};
use crate::clock::{Clock, SystemClock};
use crate::config::ResolvedConfig;
use crate::error::{InvalidAddressError, UpstreamFetchError};
use crate::market_data::providers::CoinGeckoQuoteSource;
use crate::market_data::{PriceFetcher, QuoteSource};
use crate::models::{PortfolioValuation, WalletAddress};
use crate::registry::AssetRegistry;

/// CoinGecko id of SOL.
pub const DEFAULT_NATIVE_PRICE_KEY: &str = "solana";

/// Default per-request timeout for node and price calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client for both upstreams. Every request is bounded by `timeout`.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Values a wallet from the node and the quote service.
///
/// Holds no per-request state, so one engine can serve concurrent requests.
pub struct WalletValuationEngine {
    native: NativeBalanceFetcher,
    assets: AssetBalanceFetcher,
    prices: PriceFetcher,
    registry: Arc<AssetRegistry>,
    native_price_key: String,
    observer: Arc<dyn AggregationObserver>,
    clock: Arc<dyn Clock>,
}

impl WalletValuationEngine {
    pub fn new(
        chain: Arc<dyn ChainSource>,
        quotes: Arc<dyn QuoteSource>,
        registry: Arc<AssetRegistry>,
    ) -> Self {
        Self {
            native: NativeBalanceFetcher::new(chain.clone()),
            assets: AssetBalanceFetcher::new(chain, registry.clone()),
            prices: PriceFetcher::new(quotes),
            registry,
            native_price_key: DEFAULT_NATIVE_PRICE_KEY.to_string(),
            observer: Arc::new(TracingObserver),
            clock: Arc::new(SystemClock),
        }
    }

    /// Wire the Solana RPC and CoinGecko clients from configuration.
    pub fn from_config(config: &ResolvedConfig, registry: Arc<AssetRegistry>) -> Result<Self> {
        let client = build_http_client(config.request_timeout)?;
        let chain = SolanaRpcClient::new(client.clone()).with_rpc_url(&config.rpc_url);
        let quotes = CoinGeckoQuoteSource::new(client).with_base_url(&config.price_api_url);

        Ok(Self::new(Arc::new(chain), Arc::new(quotes), registry)
            .with_native_price_key(&config.native_price_key)
            .with_token_programs(config.token_programs.clone()))
    }

    pub fn with_observer(mut self, observer: Arc<dyn AggregationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_native_price_key(mut self, key: impl Into<String>) -> Self {
        self.native_price_key = key.into();
        self
    }

    pub fn with_token_programs(mut self, programs: Vec<String>) -> Self {
        self.assets = self.assets.with_token_programs(programs);
        self
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Value `wallet_address`.
    ///
    /// Only a malformed address fails. Upstream errors are reported to the
    /// observer and the affected fields stay zero; in particular a failed SOL
    /// quote leaves `native_usd_value` at zero even when the SOL balance is known.
    pub async fn get_wallet_balance(
        &self,
        wallet_address: &str,
    ) -> Result<PortfolioValuation, InvalidAddressError> {
        let wallet = WalletAddress::parse(wallet_address)?;
        debug!(wallet = %wallet, "valuing wallet");

        let (native_quantity, native_price, discovered) = tokio::join!(
            self.native.fetch(&wallet),
            self.prices.fetch_price(&self.native_price_key),
            self.assets.fetch(&wallet),
        );

        let native_quantity =
            self.or_soft_default(&wallet, FetchStage::NativeBalance, native_quantity);

        let native_price = match native_price {
            Ok(Some(price)) => price,
            Ok(None) => {
                warn!(
                    wallet = %wallet,
                    key = %self.native_price_key,
                    "no quote returned for native currency"
                );
                Decimal::ZERO
            }
            Err(err) => {
                self.observer.soft_failure(&wallet, FetchStage::NativePrice, &err);
                Decimal::ZERO
            }
        };

        let discovered: DiscoveredHoldings =
            self.or_soft_default(&wallet, FetchStage::AssetBalances, discovered);

        let prices: HashMap<String, Decimal> = if discovered.price_lookup_keys.is_empty() {
            HashMap::new()
        } else {
            let fetched = self
                .prices
                .fetch_prices(discovered.price_lookup_keys.iter().cloned())
                .await;
            self.or_soft_default(&wallet, FetchStage::AssetPrices, fetched)
        };

        let valuation = compose_valuation(
            &wallet,
            native_quantity,
            native_price,
            &discovered.holdings,
            &prices,
            &self.registry,
            self.clock.now(),
        );

        self.observer.completed(&valuation);
        Ok(valuation)
    }

    fn or_soft_default<T: Default>(
        &self,
        wallet: &WalletAddress,
        stage: FetchStage,
        result: Result<T, UpstreamFetchError>,
    ) -> T {
        result.unwrap_or_else(|err| {
            self.observer.soft_failure(wallet, stage, &err);
            T::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};

    use crate::chain::TokenAccountRecord;
    use crate::clock::FixedClock;
    use crate::market_data::PriceKeys;
    use crate::portfolio::RecordingObserver;

    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const MINT_X: &str = "MintX111111111111111111111111111111111111111";

    const ALLOW_LIST: &str = r#"{
        "tokens": {
            "MintX111111111111111111111111111111111111111": {
                "symbol": "TX", "name": "Token X", "decimals": 6, "coingecko_id": "token-x"
            }
        }
    }"#;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[derive(Default)]
    struct StubChain {
        lamports: Option<u64>,
        accounts: Option<Vec<TokenAccountRecord>>,
        calls: AtomicUsize,
    }

    fn rpc_down() -> UpstreamFetchError {
        UpstreamFetchError::Rpc {
            service: "stub",
            code: -32000,
            message: "node unavailable".to_string(),
        }
    }

    #[async_trait::async_trait]
    impl ChainSource for StubChain {
        async fn native_balance(&self, _owner: &WalletAddress) -> Result<u64, UpstreamFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.lamports.ok_or_else(rpc_down)
        }

        async fn token_accounts(
            &self,
            _owner: &WalletAddress,
            _program_id: &str,
        ) -> Result<Vec<TokenAccountRecord>, UpstreamFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.accounts.clone().ok_or_else(rpc_down)
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    struct StubQuotes {
        prices: Option<HashMap<String, Decimal>>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl QuoteSource for StubQuotes {
        async fn fetch_usd_quotes(
            &self,
            keys: &PriceKeys,
        ) -> Result<HashMap<String, Decimal>, UpstreamFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let prices = self.prices.clone().ok_or_else(rpc_down)?;
            Ok(prices
                .into_iter()
                .filter(|(k, _)| keys.contains(k))
                .collect())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn engine(
        chain: Arc<StubChain>,
        quotes: Arc<StubQuotes>,
        observer: Arc<RecordingObserver>,
    ) -> WalletValuationEngine {
        let registry = Arc::new(AssetRegistry::from_json(ALLOW_LIST).unwrap());
        let as_of = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        WalletValuationEngine::new(chain, quotes, registry)
            .with_observer(observer)
            .with_clock(Arc::new(FixedClock(as_of)))
    }

    #[tokio::test]
    async fn invalid_address_makes_no_calls() {
        let chain = Arc::new(StubChain::default());
        let quotes = Arc::new(StubQuotes {
            prices: None,
            calls: AtomicUsize::new(0),
        });
        let engine = engine(chain.clone(), quotes.clone(), Arc::new(RecordingObserver::new()));

        let err = engine.get_wallet_balance("short").await.unwrap_err();
        assert_eq!(err.length, 5);
        assert!(engine.get_wallet_balance(&"a".repeat(45)).await.is_err());
        assert_eq!(chain.calls.load(Ordering::SeqCst), 0);
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_fetch_failing_yields_zero_valuation() {
        let chain = Arc::new(StubChain::default());
        let quotes = Arc::new(StubQuotes {
            prices: None,
            calls: AtomicUsize::new(0),
        });
        let observer = Arc::new(RecordingObserver::new());
        let engine = engine(chain, quotes, observer.clone());

        let valuation = engine.get_wallet_balance(WALLET).await.unwrap();
        assert_eq!(valuation.wallet_address, WALLET);
        assert_eq!(valuation.native_quantity, Decimal::ZERO);
        assert_eq!(valuation.native_usd_value, Decimal::ZERO);
        assert!(valuation.holdings.is_empty());
        assert_eq!(valuation.total_usd_value, Decimal::ZERO);

        let mut stages = observer.stages();
        stages.sort_by_key(|s| s.as_str());
        assert_eq!(
            stages,
            vec![
                FetchStage::AssetBalances,
                FetchStage::NativeBalance,
                FetchStage::NativePrice,
            ]
        );
    }

    #[tokio::test]
    async fn native_price_failure_keeps_quantity_but_zero_value() {
        let chain = Arc::new(StubChain {
            lamports: Some(2_500_000_000),
            accounts: Some(Vec::new()),
            ..Default::default()
        });
        let quotes = Arc::new(StubQuotes {
            prices: None,
            calls: AtomicUsize::new(0),
        });
        let observer = Arc::new(RecordingObserver::new());
        let engine = engine(chain, quotes, observer.clone());

        let valuation = engine.get_wallet_balance(WALLET).await.unwrap();
        assert_eq!(valuation.native_quantity, dec("2.5"));
        assert_eq!(valuation.native_usd_value, Decimal::ZERO);
        assert_eq!(valuation.total_usd_value, Decimal::ZERO);
        assert_eq!(observer.stages(), vec![FetchStage::NativePrice]);
    }

    #[tokio::test]
    async fn full_valuation() {
        let chain = Arc::new(StubChain {
            lamports: Some(2_500_000_000),
            accounts: Some(vec![TokenAccountRecord {
                mint: MINT_X.to_string(),
                ui_amount_string: "10.5".to_string(),
                decimals: 6,
            }]),
            ..Default::default()
        });
        let quotes = Arc::new(StubQuotes {
            prices: Some(HashMap::from([
                ("solana".to_string(), dec("150.00")),
                ("token-x".to_string(), dec("2.0")),
            ])),
            calls: AtomicUsize::new(0),
        });
        let observer = Arc::new(RecordingObserver::new());
        let engine = engine(chain, quotes.clone(), observer.clone());

        let valuation = engine.get_wallet_balance(WALLET).await.unwrap();
        assert_eq!(valuation.native_quantity, dec("2.5"));
        assert_eq!(valuation.native_usd_value, dec("375"));
        assert_eq!(valuation.holdings.len(), 1);
        assert_eq!(valuation.holdings[0].quantity, dec("10.5"));
        assert_eq!(valuation.holdings[0].usd_value, dec("21"));
        assert_eq!(valuation.total_usd_value, dec("396"));
        assert_eq!(
            valuation.as_of,
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );

        // one native quote plus one batched asset quote
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 2);
        assert!(observer.failures().is_empty());
    }

    #[tokio::test]
    async fn no_holdings_skips_asset_quote() {
        let chain = Arc::new(StubChain {
            lamports: Some(0),
            accounts: Some(vec![TokenAccountRecord {
                mint: "Unregistered".to_string(),
                ui_amount_string: "5".to_string(),
                decimals: 6,
            }]),
            ..Default::default()
        });
        let quotes = Arc::new(StubQuotes {
            prices: Some(HashMap::from([("solana".to_string(), dec("150"))])),
            calls: AtomicUsize::new(0),
        });
        let engine = engine(chain, quotes.clone(), Arc::new(RecordingObserver::new()));

        let valuation = engine.get_wallet_balance(WALLET).await.unwrap();
        assert!(valuation.holdings.is_empty());
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 1);
    }
}
