use std::env;
use std::error::Error;
use chrono::{DateTime, Local};
use tickerwatch::cache::QuoteCache;
use tickerwatch::config::Config;

// 列出缓存目录中每个代码的缓存时间和是否过期
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let data_dir = env::args().nth(1).unwrap_or_else(|| "secret".to_string());
    let config = Config::new().with_data_dir(&data_dir);
    let cache = QuoteCache::new(&config);

    let entries = cache.entries()?;
    if entries.is_empty() {
        println!("No cached quotes in {}", config.cache_dir.display());
        return Ok(());
    }

    println!("{:<10} {:<20} {:>10} {:<6}", "Symbol", "Cached At", "Age (s)", "Stale");
    println!("{:-<50}", "");
    for entry in entries {
        let cached_at: DateTime<Local> = entry.modified.into();
        println!("{:<10} {:<20} {:>10} {:<6}",
                 entry.symbol, cached_at.format("%Y-%m-%d %H:%M:%S"), entry.age.as_secs(), entry.stale);
    }
    println!("TTL: {}s", cache.ttl().as_secs());

    Ok(())
}
