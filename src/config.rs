use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认的数据根目录
pub const DEFAULT_DATA_DIR: &str = "secret";
pub const DEFAULT_API_BASE_URL: &str = "https://www.alphavantage.co/query";

/// 运行配置，构造时传入各组件，不依赖全局路径
#[derive(Debug, Clone)]
pub struct Config {
    pub key_file: PathBuf,
    pub watchlist_file: PathBuf,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub api_base_url: String,
    pub interval: String,
    pub ma_windows: Vec<usize>,
    pub request_timeout: Duration,
    pub chart_height: usize,
}

impl Config {
    pub fn new() -> Self {
        Self::default().with_data_dir(DEFAULT_DATA_DIR)
    }

    /// 把密钥文件、自选列表和缓存目录统一放到 `dir` 下
    pub fn with_data_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        let dir = dir.as_ref();
        self.key_file = dir.join("api_key.json");
        self.watchlist_file = dir.join("stocks.json");
        self.cache_dir = dir.join("cache");
        self
    }

    pub fn with_key_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.key_file = path.into();
        self
    }

    pub fn with_watchlist_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.watchlist_file = path.into();
        self
    }

    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = path.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_interval(mut self, interval: &str) -> Self {
        self.interval = interval.to_string();
        self
    }

    pub fn with_ma_windows(mut self, windows: Vec<usize>) -> Self {
        self.ma_windows = windows;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_chart_height(mut self, height: usize) -> Self {
        self.chart_height = height.max(2);
        self
    }

    /// 行情数据中时间序列字段的名称，例如 `Time Series (5min)`
    pub fn time_series_key(&self) -> String {
        format!("Time Series ({})", self.interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        let dir = Path::new(DEFAULT_DATA_DIR);
        Self {
            key_file: dir.join("api_key.json"),
            watchlist_file: dir.join("stocks.json"),
            cache_dir: dir.join("cache"),
            cache_ttl: Duration::from_secs(5 * 60),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            interval: "5min".to_string(),
            ma_windows: vec![20, 50],
            request_timeout: Duration::from_secs(30),
            chart_height: 20,
        }
    }
}
