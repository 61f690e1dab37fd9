use crate::cache::QuoteCache;
use crate::config::Config;
use crate::errors::{Result, TickerError};
use crate::fetcher::{AlphaVantageClient, QuoteSource};
use crate::indicators;
use crate::models::quote::{NewsArticle, PriceSeries, QuoteMetadata};
use crate::models::watchlist::Watchlist;
use crate::series;
use crate::store::FileStore;
use log::info;
use serde_json::Value;

/// K线图所需的数据：K线序列和各周期均线
#[derive(Debug, Clone)]
pub struct ChartData {
    pub symbol: String,
    pub series: PriceSeries,
    pub averages: Vec<(usize, Vec<f64>)>,
}

/// 自选股服务，每个操作都从磁盘重新加载状态，结束时完整写回
pub struct WatchService {
    config: Config,
    store: FileStore,
    cache: QuoteCache,
}

impl WatchService {
    pub fn new(config: Config) -> Self {
        let store = FileStore::new(&config);
        let cache = QuoteCache::new(&config);
        Self { config, store, cache }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_api_key(&self, api_key: &str) -> Result<()> {
        self.store.save_api_key(api_key)
    }

    /// 创建行情客户端；未设置密钥时返回 `ConfigMissing`
    pub fn client(&self) -> Result<AlphaVantageClient> {
        let api_key = self.store.load_api_key()?.ok_or(TickerError::ConfigMissing)?;
        AlphaVantageClient::new(&self.config, &api_key)
    }

    pub fn watchlist(&self) -> Result<Watchlist> {
        self.store.load_watchlist()
    }

    /// 已在列表中时返回 false
    pub fn add_symbol(&self, symbol: &str) -> Result<bool> {
        let mut list = self.store.load_watchlist()?;
        if !list.add(symbol) {
            return Ok(false);
        }
        self.store.save_watchlist(&list)?;
        info!("Added {} to watchlist", symbol);
        Ok(true)
    }

    /// 不在列表中时返回 false
    pub fn remove_symbol(&self, symbol: &str) -> Result<bool> {
        let mut list = self.store.load_watchlist()?;
        if !list.remove(symbol) {
            return Ok(false);
        }
        self.store.save_watchlist(&list)?;
        info!("Removed {} from watchlist", symbol);
        Ok(true)
    }

    fn quote<S: QuoteSource + ?Sized>(&self, symbol: &str, source: &S) -> Result<Value> {
        self.cache
            .get_quote(symbol, source)?
            .ok_or_else(|| TickerError::DataError(format!("No quote data available for {}", symbol)))
    }

    pub fn quote_info<S: QuoteSource + ?Sized>(&self, symbol: &str, source: &S) -> Result<QuoteMetadata> {
        let payload = self.quote(symbol, source)?;
        series::metadata(&payload)
    }

    pub fn chart<S: QuoteSource + ?Sized>(&self, symbol: &str, source: &S) -> Result<ChartData> {
        let payload = self.quote(symbol, source)?;
        let series = series::transform(&payload, &self.config.interval)?;
        let averages = indicators::moving_averages(&series.closes, &self.config.ma_windows);
        info!("Prepared {} bars for {}", series.len(), symbol);
        Ok(ChartData {
            symbol: symbol.to_string(),
            series,
            averages,
        })
    }

    /// 新闻不经过缓存
    pub fn news<S: QuoteSource + ?Sized>(&self, symbol: &str, source: &S) -> Result<Vec<NewsArticle>> {
        let payload = source.fetch_news(symbol)?;
        series::news_feed(&payload)
    }
}
