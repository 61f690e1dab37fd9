use crate::errors::Result;
use chrono::NaiveDateTime;
use serde::Deserialize;

/// 单根K线（开高低收）
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// 收盘价不低于开盘价视为阳线
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }
}

/// K线序列，以及与之一一对应的收盘价序列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    pub bars: Vec<PriceBar>,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn push(&mut self, bar: PriceBar) {
        self.closes.push(bar.close);
        self.bars.push(bar);
    }
}

/// 接口返回的单条分时记录，四个价格都是字符串
#[derive(Debug, Clone, Deserialize)]
pub struct OhlcRecord {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "2. high")]
    pub high: String,
    #[serde(rename = "3. low")]
    pub low: String,
    #[serde(rename = "4. close")]
    pub close: String,
}

/// 行情元数据
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuoteMetadata {
    #[serde(rename = "2. Symbol")]
    pub symbol: String,
    #[serde(rename = "3. Last Refreshed")]
    pub last_refreshed: String,
    #[serde(rename = "4. Interval")]
    pub interval: String,
    #[serde(rename = "5. Output Size")]
    pub output_size: String,
    #[serde(rename = "6. Time Zone")]
    pub time_zone: String,
}

/// 新闻条目
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub time_published: String,
    #[serde(default)]
    pub summary: String,
}

impl NewsArticle {
    /// `time_published` 形如 `20240105T143000`，格式不符时返回 `DateError`
    pub fn published_at(&self) -> Result<NaiveDateTime> {
        Ok(NaiveDateTime::parse_from_str(&self.time_published, "%Y%m%dT%H%M%S")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TickerError;

    #[test]
    fn series_keeps_closes_in_step_with_bars() {
        let mut series = PriceSeries::default();
        for (i, close) in [10.0, 11.5, 9.25].into_iter().enumerate() {
            series.push(PriceBar {
                timestamp: format!("t{}", i),
                open: 10.0,
                high: 12.0,
                low: 9.0,
                close,
            });
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes, vec![10.0, 11.5, 9.25]);
        assert!(series.bars[1].is_bullish());
        assert!(!series.bars[2].is_bullish());
        assert_eq!(series.bars[2].body_top(), 10.0);
    }

    #[test]
    fn parses_publish_time() {
        let article = NewsArticle {
            title: "t".into(),
            source: "s".into(),
            time_published: "20240105T143000".into(),
            summary: String::new(),
        };
        let at = article.published_at().unwrap();
        assert_eq!(at.format("%Y-%m-%d %H:%M").to_string(), "2024-01-05 14:30");

        let odd = NewsArticle { time_published: "yesterday".into(), ..article };
        assert!(matches!(odd.published_at(), Err(TickerError::DateError(_))));
    }
}
