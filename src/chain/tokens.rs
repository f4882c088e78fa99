use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use super::{ChainSource, TokenAccountRecord, TOKEN_PROGRAM_ID};
use crate::error::UpstreamFetchError;
use crate::models::{AssetHolding, WalletAddress};
use crate::registry::AssetRegistry;

/// Allow-listed holdings found for a wallet, still unpriced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredHoldings {
    /// In node response order, programs in configuration order.
    pub holdings: Vec<AssetHolding>,
    /// Lookup key of every accepted holding. May contain duplicates.
    pub price_lookup_keys: Vec<String>,
}

/// Enumerates a wallet's token accounts and keeps the allow-listed ones.
///
/// Unknown mints, zero balances and unparseable amounts are dropped
/// silently; only a failed node call is an error.
pub struct AssetBalanceFetcher {
    chain: Arc<dyn ChainSource>,
    registry: Arc<AssetRegistry>,
    token_programs: Vec<String>,
}

impl AssetBalanceFetcher {
    pub fn new(chain: Arc<dyn ChainSource>, registry: Arc<AssetRegistry>) -> Self {
        Self {
            chain,
            registry,
            token_programs: vec![TOKEN_PROGRAM_ID.to_string()],
        }
    }

    /// Replace the token programs that are scanned, one node call each.
    pub fn with_token_programs(mut self, programs: Vec<String>) -> Self {
        self.token_programs = programs;
        self
    }

    pub fn token_programs(&self) -> &[String] {
        &self.token_programs
    }

    pub async fn fetch(
        &self,
        wallet: &WalletAddress,
    ) -> Result<DiscoveredHoldings, UpstreamFetchError> {
        let mut discovered = DiscoveredHoldings::default();

        for program_id in &self.token_programs {
            let accounts = self.chain.token_accounts(wallet, program_id).await?;
            for account in &accounts {
                if let Some((holding, key)) = accept_account(&self.registry, account) {
                    discovered.holdings.push(holding);
                    discovered.price_lookup_keys.push(key);
                }
            }
        }

        debug!(
            wallet = %wallet,
            holdings = discovered.holdings.len(),
            "allow-listed holdings discovered"
        );
        Ok(discovered)
    }
}

/// Apply the allow-list and quantity filters to one account.
fn accept_account(
    registry: &AssetRegistry,
    account: &TokenAccountRecord,
) -> Option<(AssetHolding, String)> {
    let amount = account.ui_amount_string.as_str();
    if amount.is_empty() || amount == "0" {
        return None;
    }

    let Some(info) = registry.lookup(&account.mint) else {
        debug!(mint = %account.mint, "ignoring token outside allow-list");
        return None;
    };

    let Some(quantity) = parse_positive_decimal(amount) else {
        debug!(mint = %account.mint, amount, "ignoring unparseable token amount");
        return None;
    };

    if account.decimals != info.precision {
        debug!(
            mint = %account.mint,
            node_decimals = account.decimals,
            registry_decimals = info.precision,
            "token decimals differ from allow-list"
        );
    }

    Some((
        AssetHolding::unpriced(account.mint.clone(), info, quantity),
        info.price_lookup_key.clone(),
    ))
}

fn parse_positive_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
        .filter(|d| *d > Decimal::ZERO)
}
