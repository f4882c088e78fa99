//! Solana wallet valuation: native SOL plus allow-listed SPL tokens, priced in USD.

pub mod chain;
pub mod clock;
pub mod config;
pub mod duration;
pub mod error;
pub mod format;
pub mod market_data;
pub mod models;
pub mod portfolio;
pub mod registry;

pub use error::{ConfigLoadError, InvalidAddressError, UpstreamFetchError};
pub use models::{AssetHolding, AssetInfo, PortfolioValuation, WalletAddress};
pub use portfolio::WalletValuationEngine;
pub use registry::AssetRegistry;
