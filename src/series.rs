use crate::errors::{Result, TickerError};
use crate::models::quote::{NewsArticle, OhlcRecord, PriceBar, PriceSeries, QuoteMetadata};
use serde::Deserialize;
use serde_json::Value;

const META_DATA_KEY: &str = "Meta Data";
const NEWS_FEED_KEY: &str = "feed";

/// 把原始行情数据转换成K线序列和收盘价序列。
///
/// 时间序列字段缺失时返回 `MissingData`；任何一条记录无法解析时整体失败，
/// 返回 `MalformedPayload`，不会跳过或补值。
pub fn transform(payload: &Value, interval: &str) -> Result<PriceSeries> {
    let key = format!("Time Series ({})", interval);
    let section = payload
        .get(&key)
        .ok_or_else(|| TickerError::MissingData(format!("payload has no \"{}\" section", key)))?;
    let entries = section
        .as_object()
        .ok_or_else(|| TickerError::MalformedPayload(format!("\"{}\" is not an object", key)))?;

    let mut series = PriceSeries::default();
    for (timestamp, value) in entries {
        let record = OhlcRecord::deserialize(value)
            .map_err(|e| TickerError::MalformedPayload(format!("{}: {}", timestamp, e)))?;
        series.push(PriceBar {
            timestamp: timestamp.clone(),
            open: parse_price(timestamp, "open", &record.open)?,
            high: parse_price(timestamp, "high", &record.high)?,
            low: parse_price(timestamp, "low", &record.low)?,
            close: parse_price(timestamp, "close", &record.close)?,
        });
    }

    Ok(series)
}

// `f64::from_str` 也接受 "NaN"、"inf"，这里只允许有限值
fn parse_price(timestamp: &str, field: &str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TickerError::MalformedPayload(format!(
            "{} {} is not a finite number: {:?}", timestamp, field, raw
        ))),
    }
}

/// 读取 `Meta Data` 部分
pub fn metadata(payload: &Value) -> Result<QuoteMetadata> {
    let section = payload
        .get(META_DATA_KEY)
        .ok_or_else(|| TickerError::MissingData("payload has no \"Meta Data\" section".to_string()))?;
    QuoteMetadata::deserialize(section).map_err(|e| TickerError::MalformedPayload(e.to_string()))
}

/// 读取新闻列表
pub fn news_feed(payload: &Value) -> Result<Vec<NewsArticle>> {
    let feed = payload
        .get(NEWS_FEED_KEY)
        .ok_or_else(|| TickerError::MissingData("payload has no \"feed\" section".to_string()))?;
    Vec::<NewsArticle>::deserialize(feed).map_err(|e| TickerError::MalformedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bar(o: &str, h: &str, l: &str, c: &str) -> Value {
        json!({ "1. open": o, "2. high": h, "3. low": l, "4. close": c, "5. volume": "100" })
    }

    #[test]
    fn builds_bars_and_closes_in_map_order() {
        let payload = json!({
            "Time Series (5min)": {
                "2024-01-02 10:05:00": bar("101.0", "103.0", "100.5", "102.5"),
                "2024-01-02 10:00:00": bar("100.0", "101.5", "99.0", "101.0"),
            }
        });
        let series = transform(&payload, "5min").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars[0].timestamp, "2024-01-02 10:00:00");
        assert_eq!(series.bars[0].low, 99.0);
        assert_eq!(series.closes, vec![101.0, 102.5]);
    }

    #[test]
    fn missing_series_key_is_missing_data() {
        let payload = json!({ "Meta Data": {} });
        assert!(matches!(transform(&payload, "5min"), Err(TickerError::MissingData(_))));
        // 间隔不同也找不到对应字段
        let other = json!({ "Time Series (1min)": {} });
        assert!(matches!(transform(&other, "5min"), Err(TickerError::MissingData(_))));
    }

    #[test]
    fn non_numeric_price_fails_the_whole_transform() {
        let payload = json!({
            "Time Series (5min)": {
                "2024-01-02 10:00:00": bar("100.0", "101.5", "99.0", "101.0"),
                "2024-01-02 10:05:00": bar("101.0", "n/a", "100.5", "102.5"),
            }
        });
        match transform(&payload, "5min") {
            Err(TickerError::MalformedPayload(msg)) => assert!(msg.contains("high")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn non_finite_prices_are_rejected() {
        for raw in ["NaN", "inf", "-infinity"] {
            let payload = json!({
                "Time Series (5min)": { "2024-01-02 10:00:00": bar("100.0", raw, "99.0", "100.5") }
            });
            match transform(&payload, "5min") {
                Err(TickerError::MalformedPayload(msg)) => assert!(msg.contains("high"), "{}", msg),
                other => panic!("{} accepted: {:?}", raw, other),
            }
        }

        let payload = json!({
            "Time Series (5min)": { "2024-01-02 10:00:00": bar("NaN", "inf", "99.0", "NaN") }
        });
        assert!(matches!(transform(&payload, "5min"), Err(TickerError::MalformedPayload(_))));
    }

    #[test]
    fn record_without_close_is_malformed() {
        let payload = json!({
            "Time Series (5min)": { "2024-01-02 10:00:00": { "1. open": "1", "2. high": "1", "3. low": "1" } }
        });
        assert!(matches!(transform(&payload, "5min"), Err(TickerError::MalformedPayload(_))));
    }

    #[test]
    fn empty_section_gives_empty_series() {
        let payload = json!({ "Time Series (5min)": {} });
        assert!(transform(&payload, "5min").unwrap().is_empty());
    }

    #[test]
    fn reads_metadata() {
        let payload = json!({
            "Meta Data": {
                "1. Information": "Intraday (5min) open, high, low, close prices and volume",
                "2. Symbol": "IBM",
                "3. Last Refreshed": "2024-01-02 19:55:00",
                "4. Interval": "5min",
                "5. Output Size": "Compact",
                "6. Time Zone": "US/Eastern"
            }
        });
        let meta = metadata(&payload).unwrap();
        assert_eq!(meta.symbol, "IBM");
        assert_eq!(meta.time_zone, "US/Eastern");
        assert!(matches!(metadata(&json!({})), Err(TickerError::MissingData(_))));
    }

    #[test]
    fn reads_news_feed() {
        let payload = json!({
            "items": "1",
            "feed": [{
                "title": "IBM beats estimates",
                "url": "https://example.com/a",
                "source": "Newswire",
                "time_published": "20240105T143000",
                "summary": "Quarterly results.",
                "overall_sentiment_score": 0.2
            }]
        });
        let articles = news_feed(&payload).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source, "Newswire");
        assert!(matches!(news_feed(&json!({ "items": "0" })), Err(TickerError::MissingData(_))));
    }
}
