use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use super::ChainSource;
use crate::error::UpstreamFetchError;
use crate::models::WalletAddress;

/// Lamports per SOL is `10^NATIVE_DECIMALS`.
pub const NATIVE_DECIMALS: u32 = 9;

/// Convert lamports to SOL without going through floating point.
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(lamports), NATIVE_DECIMALS).normalize()
}

/// Fetches a wallet's SOL balance.
pub struct NativeBalanceFetcher {
    chain: Arc<dyn ChainSource>,
}

impl NativeBalanceFetcher {
    pub fn new(chain: Arc<dyn ChainSource>) -> Self {
        Self { chain }
    }

    pub async fn fetch(&self, wallet: &WalletAddress) -> Result<Decimal, UpstreamFetchError> {
        let lamports = self.chain.native_balance(wallet).await?;
        let sol = lamports_to_sol(lamports);
        debug!(wallet = %wallet, lamports, sol = %sol, "native balance fetched");
        Ok(sol)
    }
}
