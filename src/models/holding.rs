use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::AssetInfo;

/// One allow-listed token position inside a valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetHolding {
    pub asset_identifier: String,
    pub display_name: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub usd_value: Decimal,
    pub precision: u8,
    pub icon_ref: String,
}

impl AssetHolding {
    /// Build an unpriced holding (`usd_value` zero) from registry metadata.
    pub fn unpriced(asset_identifier: impl Into<String>, info: &AssetInfo, quantity: Decimal) -> Self {
        Self {
            asset_identifier: asset_identifier.into(),
            display_name: info.display_name.clone(),
            symbol: info.symbol.clone(),
            quantity,
            usd_value: Decimal::ZERO,
            precision: info.precision,
            icon_ref: info.icon_ref.clone(),
        }
    }

    /// Return a copy valued at `price` USD per unit.
    ///
    /// A missing or non-positive price leaves the value at zero, as does a
    /// product too large for `Decimal`.
    pub fn priced(&self, price: Option<Decimal>) -> Self {
        let usd_value = match price {
            Some(price) if price > Decimal::ZERO => {
                self.quantity.checked_mul(price).unwrap_or_else(|| {
                    warn!(
                        asset = %self.asset_identifier,
                        quantity = %self.quantity,
                        price = %price,
                        "holding value overflows, keeping zero"
                    );
                    Decimal::ZERO
                })
            }
            _ => Decimal::ZERO,
        };
        Self {
            usd_value,
            ..self.clone()
        }
    }
}
