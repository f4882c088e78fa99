//! Hooks for soft failures during aggregation.
//!
//! The engine reports every absorbed upstream error here instead of failing
//! the request, so callers can surface or assert on them.

use std::sync::Mutex;

use tracing::{info, warn};

use crate::error::UpstreamFetchError;
use crate::models::{PortfolioValuation, WalletAddress};

/// Sub-fetch that produced a soft failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStage {
    NativeBalance,
    NativePrice,
    AssetBalances,
    AssetPrices,
}

impl FetchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStage::NativeBalance => "native_balance",
            FetchStage::NativePrice => "native_price",
            FetchStage::AssetBalances => "asset_balances",
            FetchStage::AssetPrices => "asset_prices",
        }
    }
}

pub trait AggregationObserver: Send + Sync {
    fn soft_failure(&self, wallet: &WalletAddress, stage: FetchStage, error: &UpstreamFetchError);

    fn completed(&self, _valuation: &PortfolioValuation) {}
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AggregationObserver for TracingObserver {
    fn soft_failure(&self, wallet: &WalletAddress, stage: FetchStage, error: &UpstreamFetchError) {
        warn!(
            wallet = %wallet,
            stage = stage.as_str(),
            service = error.service(),
            timeout = error.is_timeout(),
            error = %error,
            "upstream fetch failed, continuing with zero"
        );
    }

    fn completed(&self, valuation: &PortfolioValuation) {
        info!(
            wallet = %valuation.wallet_address,
            native = %valuation.native_quantity,
            native_usd = %valuation.native_usd_value,
            holdings = valuation.holdings.len(),
            total_usd = %valuation.total_usd_value,
            "wallet valued"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
    pub wallet: String,
    pub stage: FetchStage,
    pub message: String,
}

/// Keeps every soft failure in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    failures: Mutex<Vec<SoftFailure>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<SoftFailure> {
        self.failures
            .lock()
            .map(|failures| failures.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<FetchStage> {
        self.failures().into_iter().map(|f| f.stage).collect()
    }
}

impl AggregationObserver for RecordingObserver {
    fn soft_failure(&self, wallet: &WalletAddress, stage: FetchStage, error: &UpstreamFetchError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(SoftFailure {
                wallet: wallet.to_string(),
                stage,
                message: error.to_string(),
            });
        }
    }
}
