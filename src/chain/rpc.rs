//! Minimal Solana JSON-RPC client over reqwest.
//!
//! Only the two read calls the valuation needs: `getBalance` and
//! `getTokenAccountsByOwner` with `jsonParsed` encoding.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{ChainSource, TokenAccountRecord};
use crate::error::UpstreamFetchError;
use crate::models::WalletAddress;

pub const SOLANA_MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";

/// Classic SPL Token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// SPL Token-2022 program.
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

const SERVICE: &str = "solana-rpc";

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `{"context": {...}, "value": ...}` wrapper used by both calls.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct KeyedTokenAccount {
    account: TokenAccount,
}

#[derive(Debug, Deserialize)]
struct TokenAccount {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    mint: String,
    token_amount: UiTokenAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiTokenAmount {
    decimals: u8,
    #[serde(default)]
    ui_amount_string: String,
}

pub struct SolanaRpcClient {
    client: reqwest::Client,
    rpc_url: String,
}

impl SolanaRpcClient {
    /// Client against mainnet-beta. The caller owns timeout policy through
    /// the supplied `reqwest::Client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            rpc_url: SOLANA_MAINNET_RPC.to_string(),
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, UpstreamFetchError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!(method, url = %self.rpc_url, "sending JSON-RPC request");

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|source| UpstreamFetchError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamFetchError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| UpstreamFetchError::Transport {
                service: SERVICE,
                source,
            })?;

        let decoded: RpcResponse<T> =
            serde_json::from_slice(&bytes).map_err(|source| UpstreamFetchError::Decode {
                service: SERVICE,
                source,
            })?;

        if let Some(error) = decoded.error {
            return Err(UpstreamFetchError::Rpc {
                service: SERVICE,
                code: error.code,
                message: error.message,
            });
        }

        decoded
            .result
            .ok_or(UpstreamFetchError::MissingResult { service: SERVICE })
    }
}

/// Decode one entry of a `getTokenAccountsByOwner` result, or `None` if the
/// entry does not have the parsed token-account shape.
fn parse_token_account(entry: Value) -> Option<TokenAccountRecord> {
    match serde_json::from_value::<KeyedTokenAccount>(entry) {
        Ok(keyed) => {
            let info = keyed.account.data.parsed.info;
            Some(TokenAccountRecord {
                mint: info.mint,
                ui_amount_string: info.token_amount.ui_amount_string,
                decimals: info.token_amount.decimals,
            })
        }
        Err(err) => {
            debug!(error = %err, "skipping malformed token account entry");
            None
        }
    }
}

#[async_trait::async_trait]
impl ChainSource for SolanaRpcClient {
    async fn native_balance(&self, owner: &WalletAddress) -> Result<u64, UpstreamFetchError> {
        let result: WithContext<u64> = self.call("getBalance", json!([owner.as_str()])).await?;
        Ok(result.value)
    }

    async fn token_accounts(
        &self,
        owner: &WalletAddress,
        program_id: &str,
    ) -> Result<Vec<TokenAccountRecord>, UpstreamFetchError> {
        let params = json!([
            owner.as_str(),
            { "programId": program_id },
            { "encoding": "jsonParsed" },
        ]);
        let result: WithContext<Vec<Value>> =
            self.call("getTokenAccountsByOwner", params).await?;

        let total = result.value.len();
        let records: Vec<TokenAccountRecord> = result
            .value
            .into_iter()
            .filter_map(parse_token_account)
            .collect();

        debug!(
            owner = %owner,
            program_id,
            total,
            parsed = records.len(),
            "token accounts fetched"
        );
        Ok(records)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}
