use crate::config::Config;
use crate::errors::Result;
use crate::fetcher::QuoteSource;
use crate::store::write_json;
use log::{debug, info, warn};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// 按股票代码缓存的行情文件，过期时间以文件修改时间为准
pub struct QuoteCache {
    dir: PathBuf,
    ttl: Duration,
}

/// 缓存目录中的一条记录
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub symbol: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub age: Duration,
    pub stale: bool,
}

impl QuoteCache {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.cache_dir.clone(),
            ttl: config.cache_ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 缓存文件路径：`<cache_dir>/<编码后的代码>.json`，始终位于缓存目录内
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_symbol(symbol)))
    }

    fn age_at(&self, symbol: &str, now: SystemTime) -> Option<Duration> {
        let modified = fs::metadata(self.path_for(symbol))
            .and_then(|meta| meta.modified())
            .ok()?;
        Some(age_since(modified, now))
    }

    pub fn is_stale(&self, symbol: &str) -> bool {
        self.is_stale_at(symbol, SystemTime::now())
    }

    /// 文件不存在，或修改时间早于 `now - ttl`
    pub fn is_stale_at(&self, symbol: &str, now: SystemTime) -> bool {
        match self.age_at(symbol, now) {
            Some(age) => age > self.ttl,
            None => true,
        }
    }

    /// 文件不存在或无法解析时返回 None，其余 IO 错误向上传递
    pub fn load(&self, symbol: &str) -> Result<Option<Value>> {
        let path = self.path_for(symbol);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring unreadable cache file {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    pub fn store(&self, symbol: &str, payload: &Value) -> Result<()> {
        let path = self.path_for(symbol);
        write_json(&path, payload)?;
        info!("Cached {} at {}", symbol, path.display());
        Ok(())
    }

    /// 未过期时直接读缓存；否则重新抓取并写入缓存。
    ///
    /// 抓取失败时返回 None，即使磁盘上还有过期的旧数据也不会使用。
    pub fn get_quote<S: QuoteSource + ?Sized>(&self, symbol: &str, source: &S) -> Result<Option<Value>> {
        if !self.is_stale(symbol) {
            debug!("Cache hit for {}", symbol);
            return self.load(symbol);
        }

        debug!("Cache miss for {}, fetching", symbol);
        match source.fetch_intraday(symbol) {
            Ok(payload) => {
                self.store(symbol, &payload)?;
                Ok(Some(payload))
            }
            Err(e) => {
                warn!("Failed to refresh {}: {}", symbol, e);
                Ok(None)
            }
        }
    }

    /// 列出缓存目录下的所有记录，按代码排序
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let now = SystemTime::now();
        let mut entries = Vec::new();
        for item in read_dir {
            let path = item?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(symbol) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_symbol) else {
                continue;
            };
            // 列目录之后被删除的文件直接跳过
            let Ok(modified) = fs::metadata(&path).and_then(|meta| meta.modified()) else {
                continue;
            };
            let age = age_since(modified, now);
            entries.push(CacheEntry {
                symbol,
                path,
                modified,
                age,
                stale: age > self.ttl,
            });
        }
        entries.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(entries)
    }
}

// 修改时间在未来时按刚写入处理
fn age_since(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or_default()
}

// 代码原样来自用户输入，文件名只保留 [A-Za-z0-9._-]，其余字节写成 %XX
fn encode_symbol(symbol: &str) -> String {
    let mut encoded = String::with_capacity(symbol.len());
    for byte in symbol.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

fn decode_symbol(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
