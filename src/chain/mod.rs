//! Node-side data: native balance and token accounts.

mod native;
mod rpc;
mod tokens;

pub use native::{lamports_to_sol, NativeBalanceFetcher, NATIVE_DECIMALS};
pub use rpc::{SolanaRpcClient, SOLANA_MAINNET_RPC, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
pub use tokens::{AssetBalanceFetcher, DiscoveredHoldings};

use crate::error::UpstreamFetchError;
use crate::models::WalletAddress;

/// One parsed token account as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountRecord {
    pub mint: String,
    /// Human-readable amount, already scaled by `decimals`.
    pub ui_amount_string: String,
    pub decimals: u8,
}

/// Account queries against a Solana node.
#[async_trait::async_trait]
pub trait ChainSource: Send + Sync {
    /// Native balance in lamports.
    async fn native_balance(&self, owner: &WalletAddress) -> Result<u64, UpstreamFetchError>;

    /// Every token account owned by `owner` under one token program,
    /// in the order the node returned them.
    async fn token_accounts(
        &self,
        owner: &WalletAddress,
        program_id: &str,
    ) -> Result<Vec<TokenAccountRecord>, UpstreamFetchError>;

    fn name(&self) -> &str;
}
