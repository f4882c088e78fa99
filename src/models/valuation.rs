use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::AssetHolding;

/// Portfolio value of one wallet: native balance plus allow-listed tokens.
///
/// `total_usd_value` always equals `native_usd_value` plus the sum of the
/// holdings' `usd_value`. Construct through [`PortfolioValuation::compose`]
/// to keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub wallet_address: String,
    pub native_quantity: Decimal,
    pub native_usd_value: Decimal,
    pub holdings: Vec<AssetHolding>,
    pub total_usd_value: Decimal,
    pub as_of: DateTime<Utc>,
}

impl PortfolioValuation {
    /// A holding whose value would push the total past `Decimal::MAX` is
    /// zeroed, so the total still equals the sum of its parts.
    pub fn compose(
        wallet_address: impl Into<String>,
        native_quantity: Decimal,
        native_usd_value: Decimal,
        mut holdings: Vec<AssetHolding>,
        as_of: DateTime<Utc>,
    ) -> Self {
        let mut total_usd_value = native_usd_value;
        for holding in &mut holdings {
            match total_usd_value.checked_add(holding.usd_value) {
                Some(total) => total_usd_value = total,
                None => {
                    warn!(
                        asset = %holding.asset_identifier,
                        usd_value = %holding.usd_value,
                        "wallet total overflows, dropping holding value"
                    );
                    holding.usd_value = Decimal::ZERO;
                }
            }
        }
        Self {
            wallet_address: wallet_address.into(),
            native_quantity,
            native_usd_value,
            holdings,
            total_usd_value,
            as_of,
        }
    }

    /// All-zero valuation, what a wallet looks like when every fetch failed.
    pub fn empty(wallet_address: impl Into<String>, as_of: DateTime<Utc>) -> Self {
        Self::compose(wallet_address, Decimal::ZERO, Decimal::ZERO, Vec::new(), as_of)
    }

    pub fn holdings_usd_value(&self) -> Decimal {
        self.holdings.iter().map(|h| h.usd_value).sum()
    }
}
