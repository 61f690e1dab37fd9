use crate::config::Config;
use crate::errors::{Result, TickerError};
use log::{debug, error, info};
use reqwest::blocking::Client;
use serde_json::Value;

/// 行情数据来源
pub trait QuoteSource {
    /// 获取分时K线原始数据
    fn fetch_intraday(&self, symbol: &str) -> Result<Value>;

    /// 获取新闻原始数据
    fn fetch_news(&self, symbol: &str) -> Result<Value>;
}

/// Alpha Vantage 数据抓取器
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
    interval: String,
}

impl AlphaVantageClient {
    pub fn new(config: &Config, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(TickerError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            api_key: api_key.to_string(),
            interval: config.interval.clone(),
        })
    }

    fn query(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        let response = self.client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            error!("Failed to fetch data for {}. Error {}.", symbol, status.as_u16());
            return Err(TickerError::RemoteFetchFailed {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let json: Value = response.json()?;
        check_provider_message(&json)?;
        debug!("成功获取 {} 的响应", symbol);
        Ok(json)
    }
}

impl QuoteSource for AlphaVantageClient {
    fn fetch_intraday(&self, symbol: &str) -> Result<Value> {
        info!("获取 {} 的分时数据 ({})", symbol, self.interval);
        self.query(symbol, &[
            ("function", "TIME_SERIES_INTRADAY"),
            ("symbol", symbol),
            ("interval", self.interval.as_str()),
        ])
    }

    fn fetch_news(&self, symbol: &str) -> Result<Value> {
        info!("获取 {} 的新闻", symbol);
        self.query(symbol, &[
            ("function", "NEWS_SENTIMENT"),
            ("tickers", symbol),
        ])
    }
}

// 服务端在 200 响应里返回错误或限流提示，这类内容不能写进缓存
fn check_provider_message(json: &Value) -> Result<()> {
    for key in ["Error Message", "Note", "Information"] {
        if let Some(message) = json.get(key).and_then(|m| m.as_str()) {
            error!("Provider returned {:?}: {}", key, message);
            return Err(TickerError::ApiError(message.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_notices_are_rejected() {
        let note = json!({ "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute." });
        assert!(matches!(check_provider_message(&note), Err(TickerError::ApiError(m)) if m.starts_with("Thank you")));

        let invalid = json!({ "Error Message": "Invalid API call." });
        assert!(check_provider_message(&invalid).is_err());
    }

    #[test]
    fn regular_payload_passes() {
        let payload = json!({ "Meta Data": {}, "Time Series (5min)": {} });
        assert!(check_provider_message(&payload).is_ok());
    }

    #[test]
    fn client_builds_from_config() {
        let config = Config::new().with_api_base_url("http://127.0.0.1:9/query");
        let client = AlphaVantageClient::new(&config, "demo").unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9/query");
        assert_eq!(client.interval, "5min");
    }
}
