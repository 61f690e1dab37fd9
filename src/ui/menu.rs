use crate::errors::Result;
use crate::fetcher::QuoteSource;
use crate::services::watch_service::WatchService;
use crate::ui::report;
use log::debug;
use std::io::{BufRead, Write};

/// 主菜单命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetApiKey,
    AddSymbol,
    RemoveSymbol,
    ShowInfo,
    PlotChart,
    ViewNews,
    Exit,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::SetApiKey,
        Command::AddSymbol,
        Command::RemoveSymbol,
        Command::ShowInfo,
        Command::PlotChart,
        Command::ViewNews,
        Command::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Command::SetApiKey => "Set API Key",
            Command::AddSymbol => "Add Stock",
            Command::RemoveSymbol => "Remove Stock",
            Command::ShowInfo => "Show Stock Information",
            Command::PlotChart => "Plot Stock Chart",
            Command::ViewNews => "View Stock News",
            Command::Exit => "Exit",
        }
    }
}

/// 命令执行后是否继续主循环
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// 交互式菜单，输入输出可替换，便于测试
pub struct Menu<'a, R, W> {
    service: &'a WatchService,
    input: R,
    output: W,
    source: Option<Box<dyn QuoteSource + 'a>>,
    clear: bool,
    inline_charts: bool,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(service: &'a WatchService, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
            source: None,
            clear: true,
            inline_charts: false,
        }
    }

    /// 使用固定的数据源，而不是每次按已保存的密钥创建客户端
    pub fn with_source(mut self, source: Box<dyn QuoteSource + 'a>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// 输出是终端时用内联视口画图，否则按终端宽度输出文本
    pub fn with_inline_charts(mut self, inline: bool) -> Self {
        self.inline_charts = inline;
        self
    }

    fn handler(command: Command) -> fn(&mut Self) -> Result<Flow> {
        match command {
            Command::SetApiKey => Self::set_api_key,
            Command::AddSymbol => Self::add_symbol,
            Command::RemoveSymbol => Self::remove_symbol,
            Command::ShowInfo => Self::show_info,
            Command::PlotChart => Self::plot_chart,
            Command::ViewNews => Self::view_news,
            Command::Exit => Self::exit,
        }
    }

    /// 主循环：任何操作失败都只输出提示，然后回到菜单
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(command) = self.choose_command()? else {
                // 输入结束
                return Ok(());
            };
            debug!("Menu command: {:?}", command);

            match Self::handler(command)(self) {
                Ok(Flow::Exit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => report::failure(&mut self.output, &e.to_string())?,
            }
        }
    }

    fn choose_command(&mut self) -> Result<Option<Command>> {
        let labels: Vec<String> = Command::ALL.iter().map(|c| c.label().to_string()).collect();
        loop {
            match self.select("What would you like to do?", &labels)? {
                Selection::Picked(idx) => return Ok(Some(Command::ALL[idx])),
                Selection::Invalid => {
                    report::failure(&mut self.output, "Invalid choice. Please enter a valid option.")?;
                }
                Selection::Closed => return Ok(None),
            }
        }
    }

    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    /// 按编号或名称选择
    fn select(&mut self, message: &str, choices: &[String]) -> Result<Selection> {
        writeln!(self.output, "{}", message)?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, choice)?;
        }
        let Some(answer) = self.prompt("> ")? else {
            return Ok(Selection::Closed);
        };
        let answer = answer.trim();

        if let Ok(n) = answer.parse::<usize>() {
            if (1..=choices.len()).contains(&n) {
                return Ok(Selection::Picked(n - 1));
            }
        }
        Ok(choices
            .iter()
            .position(|c| c.eq_ignore_ascii_case(answer))
            .map(Selection::Picked)
            .unwrap_or(Selection::Invalid))
    }

    fn clear_screen(&mut self) -> Result<()> {
        if self.clear {
            report::clear_screen(&mut self.output)?;
        }
        Ok(())
    }

    fn pick_symbol(&mut self) -> Result<Option<String>> {
        let watchlist = self.service.watchlist()?;
        if watchlist.is_empty() {
            report::notice(&mut self.output, "No stock symbols found. Please add stocks.")?;
            return Ok(None);
        }
        let symbols = watchlist.symbols().to_vec();
        match self.select("Select a stock symbol:", &symbols)? {
            Selection::Picked(idx) => Ok(Some(symbols[idx].clone())),
            Selection::Invalid => {
                report::failure(&mut self.output, "Invalid choice. Please enter a valid option.")?;
                Ok(None)
            }
            Selection::Closed => Ok(None),
        }
    }

    fn with_quote_source<T>(&self, f: impl FnOnce(&dyn QuoteSource) -> Result<T>) -> Result<T> {
        match &self.source {
            Some(source) => f(source.as_ref()),
            None => {
                let client = self.service.client()?;
                f(&client)
            }
        }
    }

    fn set_api_key(&mut self) -> Result<Flow> {
        let Some(key) = self.prompt("Enter your API key: ")? else {
            return Ok(Flow::Exit);
        };
        self.service.set_api_key(&key)?;
        report::success(&mut self.output, "API key saved successfully.")?;
        self.clear_screen()?;
        Ok(Flow::Continue)
    }

    fn add_symbol(&mut self) -> Result<Flow> {
        let Some(symbol) = self.prompt("Enter stock symbol to add: ")? else {
            return Ok(Flow::Exit);
        };
        self.clear_screen()?;
        if self.service.add_symbol(&symbol)? {
            report::success(&mut self.output, &format!("Stock {} added successfully.", symbol))?;
        } else {
            report::notice(&mut self.output, &format!("Stock {} is already in the list.", symbol))?;
        }
        Ok(Flow::Continue)
    }

    fn remove_symbol(&mut self) -> Result<Flow> {
        let Some(symbol) = self.prompt("Enter stock symbol to remove: ")? else {
            return Ok(Flow::Exit);
        };
        self.clear_screen()?;
        if self.service.remove_symbol(&symbol)? {
            report::success(&mut self.output, &format!("Stock {} removed successfully.", symbol))?;
        } else {
            report::notice(&mut self.output, &format!("Stock {} is not in the list.", symbol))?;
        }
        Ok(Flow::Continue)
    }

    fn show_info(&mut self) -> Result<Flow> {
        self.clear_screen()?;
        let Some(symbol) = self.pick_symbol()? else {
            return Ok(Flow::Continue);
        };
        let service = self.service;
        let meta = self.with_quote_source(|source| service.quote_info(&symbol, source))?;
        report::print_metadata(&mut self.output, &meta)?;
        Ok(Flow::Continue)
    }

    fn plot_chart(&mut self) -> Result<Flow> {
        self.clear_screen()?;
        let Some(symbol) = self.pick_symbol()? else {
            return Ok(Flow::Continue);
        };
        let service = self.service;
        let data = self.with_quote_source(|source| service.chart(&symbol, source))?;
        let height = service.config().chart_height;
        if self.inline_charts {
            report::draw_chart_inline(&mut self.output, &data, height)?;
        } else {
            report::print_chart(&mut self.output, &data, height, report::terminal_width())?;
        }
        Ok(Flow::Continue)
    }

    fn view_news(&mut self) -> Result<Flow> {
        self.clear_screen()?;
        let Some(symbol) = self.pick_symbol()? else {
            return Ok(Flow::Continue);
        };
        let service = self.service;
        let articles = self.with_quote_source(|source| service.news(&symbol, source))?;
        report::print_news(&mut self.output, &articles)?;
        Ok(Flow::Continue)
    }

    fn exit(&mut self) -> Result<Flow> {
        report::notice(&mut self.output, "Exiting the program.")?;
        Ok(Flow::Exit)
    }
}

enum Selection {
    Picked(usize),
    Invalid,
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use std::io::Cursor;
    use tempfile::{tempdir, TempDir};

    struct StaticSource;

    impl QuoteSource for StaticSource {
        fn fetch_intraday(&self, _symbol: &str) -> Result<Value> {
            Ok(json!({
                "Meta Data": {
                    "2. Symbol": "IBM",
                    "3. Last Refreshed": "2024-01-02 19:55:00",
                    "4. Interval": "5min",
                    "5. Output Size": "Compact",
                    "6. Time Zone": "US/Eastern"
                },
                "Time Series (5min)": {
                    "2024-01-02 19:50:00": { "1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "1.5" },
                    "2024-01-02 19:55:00": { "1. open": "1.5", "2. high": "1.75", "3. low": "1", "4. close": "1.25" }
                }
            }))
        }

        fn fetch_news(&self, _symbol: &str) -> Result<Value> {
            Ok(json!({ "items": "0" }))
        }
    }

    fn service() -> (TempDir, WatchService) {
        let dir = tempdir().unwrap();
        let service = WatchService::new(Config::new().with_data_dir(dir.path()));
        (dir, service)
    }

    fn run(service: &WatchService, script: &str, source: Option<Box<dyn QuoteSource>>) -> String {
        let mut out = Vec::new();
        {
            let mut menu = Menu::new(service, Cursor::new(script.to_string()), &mut out).with_clear_screen(false);
            if let Some(source) = source {
                menu = menu.with_source(source);
            }
            menu.run().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn every_command_has_a_distinct_label() {
        let labels: HashSet<_> = Command::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels.len(), Command::ALL.len());
    }

    #[test]
    fn adds_and_removes_symbols_until_exit() {
        let (_dir, service) = service();
        let out = run(&service, "2\nAAPL\n2\nAAPL\nadd stock\nIBM\n3\nTSLA\n3\nAAPL\n7\n", None);
        assert!(out.contains("Stock AAPL added successfully."));
        assert!(out.contains("Stock AAPL is already in the list."));
        assert!(out.contains("Stock TSLA is not in the list."));
        assert!(out.contains("Stock AAPL removed successfully."));
        assert!(out.contains("Exiting the program."));
        assert_eq!(service.watchlist().unwrap().symbols(), ["IBM"]);
    }

    #[test]
    fn invalid_choice_keeps_the_loop_going() {
        let (_dir, service) = service();
        let out = run(&service, "9\nhello\n1\nsecret\n", None);
        assert_eq!(out.matches("Invalid choice").count(), 2);
        assert!(out.contains("API key saved successfully."));
    }

    #[test]
    fn missing_key_is_reported_and_loop_continues() {
        let (_dir, service) = service();
        service.add_symbol("IBM").unwrap();
        let out = run(&service, "4\n1\n7\n", None);
        assert!(out.contains("API key is not set. Please set the API key first."));
        assert!(out.contains("Exiting the program."));
    }

    #[test]
    fn empty_watchlist_skips_the_fetch() {
        let (_dir, service) = service();
        let out = run(&service, "5\n7\n", None);
        assert!(out.contains("No stock symbols found. Please add stocks."));
    }

    #[test]
    fn info_chart_and_news_use_the_source() {
        let (_dir, service) = service();
        service.add_symbol("IBM").unwrap();
        let out = run(&service, "4\n1\n5\nIBM\n6\n1\n7\n", Some(Box::new(StaticSource)));
        assert!(out.contains("Stock Symbol: IBM"));
        assert!(out.contains("Time Zone: US/Eastern"));
        assert!(out.contains("Candlestick Chart for IBM"));
        assert!(out.contains("MA20: not enough data (2 bars)"));
        assert!(out.contains("Missing data"));
    }
}
