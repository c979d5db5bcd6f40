pub mod cache;

pub use cache::{CacheError, TickerCache};
