use serde::{Deserialize, Serialize};

/// 自选股列表：保持插入顺序，不允许重复
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Watchlist {
    symbols: Vec<String>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已存在时返回 false，列表不变
    pub fn add(&mut self, symbol: &str) -> bool {
        if self.contains(symbol) {
            return false;
        }
        self.symbols.push(symbol.to_string());
        true
    }

    /// 不存在时返回 false，列表不变
    pub fn remove(&mut self, symbol: &str) -> bool {
        match self.symbols.iter().position(|s| s == symbol) {
            Some(idx) => {
                self.symbols.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

// 手工编辑过的文件可能有重复项，保留第一次出现的
impl From<Vec<String>> for Watchlist {
    fn from(symbols: Vec<String>) -> Self {
        let mut list = Watchlist::new();
        for symbol in &symbols {
            list.add(symbol);
        }
        list
    }
}

impl From<Watchlist> for Vec<String> {
    fn from(list: Watchlist) -> Self {
        list.symbols
    }
}
