use crate::config::Config;
use crate::errors::Result;
use crate::models::watchlist::Watchlist;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 保存 API 密钥和自选列表的 JSON 文件存储
pub struct FileStore {
    key_file: PathBuf,
    watchlist_file: PathBuf,
}

impl FileStore {
    pub fn new(config: &Config) -> Self {
        Self {
            key_file: config.key_file.clone(),
            watchlist_file: config.watchlist_file.clone(),
        }
    }

    /// 文件不存在或内容为空时返回 None
    pub fn load_api_key(&self) -> Result<Option<String>> {
        let key: Option<String> = read_json(&self.key_file)?;
        Ok(key.filter(|k| !k.trim().is_empty()))
    }

    pub fn save_api_key(&self, api_key: &str) -> Result<()> {
        write_json(&self.key_file, &api_key.trim())?;
        info!("API key saved to {}", self.key_file.display());
        Ok(())
    }

    pub fn load_watchlist(&self) -> Result<Watchlist> {
        Ok(read_json(&self.watchlist_file)?.unwrap_or_default())
    }

    pub fn save_watchlist(&self, watchlist: &Watchlist) -> Result<()> {
        write_json(&self.watchlist_file, watchlist)?;
        debug!("Saved {} symbols to {}", watchlist.len(), self.watchlist_file.display());
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    // 确保目录存在
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_vec(value)?)?;
    Ok(())
}
