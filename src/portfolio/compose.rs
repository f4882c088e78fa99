use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{AssetHolding, PortfolioValuation, WalletAddress};
use crate::registry::AssetRegistry;

/// Native value, or zero when the quote is missing, non-positive, or the
/// product does not fit in a `Decimal`.
pub fn native_usd_value(quantity: Decimal, price: Decimal) -> Decimal {
    if price <= Decimal::ZERO || quantity <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    quantity.checked_mul(price).unwrap_or_else(|| {
        warn!(quantity = %quantity, price = %price, "native value overflows, keeping zero");
        Decimal::ZERO
    })
}

/// Price each holding through its registry lookup key and total the wallet.
///
/// A holding whose key has no quote keeps a zero value.
pub fn compose_valuation(
    wallet: &WalletAddress,
    native_quantity: Decimal,
    native_price: Decimal,
    holdings: &[AssetHolding],
    prices: &HashMap<String, Decimal>,
    registry: &AssetRegistry,
    as_of: DateTime<Utc>,
) -> PortfolioValuation {
    let native_quantity = native_quantity.max(Decimal::ZERO);

    let priced = holdings
        .iter()
        .map(|holding| {
            let price = registry
                .lookup(&holding.asset_identifier)
                .and_then(|info| prices.get(&info.price_lookup_key))
                .copied();
            holding.priced(price)
        })
        .collect();

    PortfolioValuation::compose(
        wallet.as_str(),
        native_quantity,
        native_usd_value(native_quantity, native_price),
        priced,
        as_of,
    )
}
