mod compose;
mod engine;
mod observer;

pub use compose::{compose_valuation, native_usd_value};
pub use engine::{
    build_http_client, WalletValuationEngine, DEFAULT_NATIVE_PRICE_KEY, DEFAULT_REQUEST_TIMEOUT,
};
pub use observer::{AggregationObserver, FetchStage, RecordingObserver, SoftFailure, TracingObserver};
