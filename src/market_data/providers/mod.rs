pub mod coingecko;

pub use coingecko::CoinGeckoQuoteSource;
