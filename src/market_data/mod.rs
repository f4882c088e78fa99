mod fetcher;
mod keys;
pub mod providers;
mod source;

pub use fetcher::PriceFetcher;
pub use keys::PriceKeys;
pub use source::QuoteSource;
