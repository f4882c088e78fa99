use serde::{Deserialize, Serialize};

/// Allow-list metadata for one token, keyed by mint address in the registry.
///
/// Field names on the wire follow the allow-list file format
/// (`name`, `decimals`, `logoURI`, `coingecko_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub symbol: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "decimals")]
    pub precision: u8,
    /// CoinGecko coin id used to quote this asset.
    #[serde(rename = "coingecko_id")]
    pub price_lookup_key: String,
    #[serde(rename = "logoURI", default)]
    pub icon_ref: String,
}
