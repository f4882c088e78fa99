mod address;
mod asset;
mod holding;
mod valuation;

pub use address::{is_valid_address, WalletAddress, MAX_ADDRESS_LEN, MIN_ADDRESS_LEN};
pub use asset::AssetInfo;
pub use holding::AssetHolding;
pub use valuation::PortfolioValuation;
