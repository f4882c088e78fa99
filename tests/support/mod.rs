#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use walletfolio::chain::SolanaRpcClient;
use walletfolio::clock::FixedClock;
use walletfolio::market_data::providers::CoinGeckoQuoteSource;
use walletfolio::portfolio::{build_http_client, RecordingObserver};
use walletfolio::{AssetRegistry, WalletValuationEngine};

pub const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
pub const BONK_MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const TOKEN_X_MINT: &str = "MintX111111111111111111111111111111111111111";

pub const ALLOW_LIST: &str = r#"{
    "tokens": {
        "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v": {
            "symbol": "USDC", "name": "USD Coin", "decimals": 6,
            "logoURI": "usdc.png", "coingecko_id": "usd-coin"
        },
        "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB": {
            "symbol": "USDT", "name": "Tether USD", "decimals": 6,
            "logoURI": "usdt.png", "coingecko_id": "tether"
        },
        "MintX111111111111111111111111111111111111111": {
            "symbol": "TX", "name": "Token X", "decimals": 6,
            "logoURI": "x.png", "coingecko_id": "token-x"
        }
    }
}"#;

pub fn registry() -> Arc<AssetRegistry> {
    Arc::new(AssetRegistry::from_json(ALLOW_LIST).expect("allow-list fixture parses"))
}

pub fn http_client() -> reqwest::Client {
    build_http_client(Duration::from_secs(5)).expect("client builds")
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()))
}

/// Engine wired to mock node and price servers.
pub fn engine(
    rpc_uri: &str,
    price_uri: &str,
    observer: Arc<RecordingObserver>,
) -> WalletValuationEngine {
    engine_with_timeout(rpc_uri, price_uri, observer, Duration::from_secs(5))
}

pub fn engine_with_timeout(
    rpc_uri: &str,
    price_uri: &str,
    observer: Arc<RecordingObserver>,
    timeout: Duration,
) -> WalletValuationEngine {
    let client = build_http_client(timeout).expect("client builds");
    let chain = SolanaRpcClient::new(client.clone()).with_rpc_url(rpc_uri);
    let quotes = CoinGeckoQuoteSource::new(client).with_base_url(price_uri);
    WalletValuationEngine::new(Arc::new(chain), Arc::new(quotes), registry())
        .with_observer(observer)
        .with_clock(fixed_clock())
}

pub fn rpc_result(value: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "context": { "slot": 270000000 },
            "value": value,
        }
    })
}

pub fn rpc_error(code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message }
    })
}

/// One `jsonParsed` entry of a `getTokenAccountsByOwner` result.
pub fn token_account(mint: &str, ui_amount_string: &str, decimals: u8) -> Value {
    json!({
        "pubkey": "TokenAcct1111111111111111111111111111111111",
        "account": {
            "lamports": 2039280,
            "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
            "executable": false,
            "rentEpoch": 361,
            "data": {
                "program": "spl-token",
                "space": 165,
                "parsed": {
                    "type": "account",
                    "info": {
                        "isNative": false,
                        "mint": mint,
                        "owner": WALLET,
                        "state": "initialized",
                        "tokenAmount": {
                            "amount": "0",
                            "decimals": decimals,
                            "uiAmountString": ui_amount_string
                        }
                    }
                }
            }
        }
    })
}
