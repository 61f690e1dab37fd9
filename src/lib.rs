// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod cache;
pub mod series;
pub mod indicators;
pub mod fetcher;

// 终端交互和命令行使用的模块
#[doc(hidden)]
pub mod store;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod ui;

// 重新导出常用类型，方便使用
pub use models::quote::{PriceBar, PriceSeries, QuoteMetadata, NewsArticle};
pub use models::watchlist::Watchlist;
pub use cache::QuoteCache;
pub use config::Config;
pub use fetcher::{AlphaVantageClient, QuoteSource};
pub use indicators::moving_average;
pub use errors::{Result, TickerError};
