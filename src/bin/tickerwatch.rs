use tickerwatch::config::Config;
use tickerwatch::services::watch_service::WatchService;
use tickerwatch::ui::menu::Menu;
use tickerwatch::ui::report;

use anyhow::Context;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use std::io::{self, IsTerminal};
use std::time::Duration;

fn symbol_arg() -> Arg<'static> {
    Arg::with_name("symbol")
        .value_name("SYMBOL")
        .help("Stock symbol")
        .required(true)
        .index(1)
}

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let matches = App::new("tickerwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track a stock watchlist, cache intraday quotes and chart them in the terminal")
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the API key, watchlist and quote cache")
                .takes_value(true)
                .default_value("secret"),
        )
        .arg(
            Arg::with_name("ttl")
                .long("ttl")
                .value_name("SECONDS")
                .help("Seconds before a cached quote is refreshed")
                .takes_value(true)
                .default_value("300")
                .validator(parse_ttl),
        )
        .arg(
            Arg::with_name("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Market data API endpoint")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .value_name("ROWS")
                .help("Candlestick chart height (at least 2)")
                .takes_value(true)
                .default_value("20")
                .validator(parse_height),
        )
        .subcommand(
            SubCommand::with_name("set-key")
                .about("Save the API key")
                .arg(Arg::with_name("key").value_name("KEY").required(true).index(1)),
        )
        .subcommand(SubCommand::with_name("add").about("Add a symbol to the watchlist").arg(symbol_arg()))
        .subcommand(SubCommand::with_name("remove").about("Remove a symbol from the watchlist").arg(symbol_arg()))
        .subcommand(SubCommand::with_name("list").about("Show the watchlist"))
        .subcommand(SubCommand::with_name("info").about("Show quote metadata").arg(symbol_arg()))
        .subcommand(SubCommand::with_name("chart").about("Plot candlesticks and moving averages").arg(symbol_arg()))
        .subcommand(SubCommand::with_name("news").about("Show recent news").arg(symbol_arg()))
        .get_matches();

    let config = build_config(&matches)?;
    info!("Using data directory {}", config.key_file.parent().map(|p| p.display().to_string()).unwrap_or_default());
    let service = WatchService::new(config);

    match matches.subcommand() {
        None => {
            let stdin = io::stdin();
            let mut menu = Menu::new(&service, stdin.lock(), io::stdout())
                .with_inline_charts(io::stdout().is_terminal());
            menu.run()?;
        }
        Some((name, sub)) => run_subcommand(&service, name, sub)?,
    }

    Ok(())
}

fn parse_ttl(value: &str) -> Result<u64, String> {
    value.trim()
        .parse::<u64>()
        .map_err(|_| format!("expected a whole number of seconds, got {:?}", value))
}

// K线区域至少要有最高价和最低价两行
fn parse_height(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(rows) if rows >= 2 => Ok(rows),
        Ok(rows) => Err(format!("chart height must be at least 2 rows, got {}", rows)),
        Err(_) => Err(format!("expected a number of rows, got {:?}", value)),
    }
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let ttl = parse_ttl(matches.value_of("ttl").unwrap_or("300")).map_err(anyhow::Error::msg)?;
    let height = parse_height(matches.value_of("height").unwrap_or("20")).map_err(anyhow::Error::msg)?;

    let mut config = Config::new()
        .with_data_dir(matches.value_of("data-dir").unwrap_or("secret"))
        .with_cache_ttl(Duration::from_secs(ttl))
        .with_chart_height(height);
    if let Some(url) = matches.value_of("base-url") {
        config = config.with_api_base_url(url);
    }
    Ok(config)
}

fn run_subcommand(service: &WatchService, name: &str, sub: &ArgMatches) -> anyhow::Result<()> {
    let mut out = io::stdout();
    // 只有带 SYMBOL 参数的子命令才能读取它
    let symbol = || sub.value_of("symbol").unwrap_or_default();

    match name {
        "set-key" => {
            service.set_api_key(sub.value_of("key").unwrap_or_default())?;
            report::success(&mut out, "API key saved successfully.")?;
        }
        "add" => {
            if service.add_symbol(symbol())? {
                report::success(&mut out, &format!("Stock {} added successfully.", symbol()))?;
            } else {
                report::notice(&mut out, &format!("Stock {} is already in the list.", symbol()))?;
            }
        }
        "remove" => {
            if service.remove_symbol(symbol())? {
                report::success(&mut out, &format!("Stock {} removed successfully.", symbol()))?;
            } else {
                report::notice(&mut out, &format!("Stock {} is not in the list.", symbol()))?;
            }
        }
        "list" => report::print_watchlist(&mut out, &service.watchlist()?)?,
        "info" => {
            let client = service.client()?;
            let meta = service.quote_info(symbol(), &client)
                .with_context(|| format!("Failed to fetch stock information for {}", symbol()))?;
            report::print_metadata(&mut out, &meta)?;
        }
        "chart" => {
            let client = service.client()?;
            let data = service.chart(symbol(), &client)
                .with_context(|| format!("Failed to fetch stock data for {}", symbol()))?;
            let height = service.config().chart_height;
            if out.is_terminal() {
                report::draw_chart_inline(&mut out, &data, height)?;
            } else {
                report::print_chart(&mut out, &data, height, report::terminal_width())?;
            }
        }
        "news" => {
            let client = service.client()?;
            let articles = service.news(symbol(), &client)
                .with_context(|| format!("Failed to fetch stock news for {}", symbol()))?;
            report::print_news(&mut out, &articles)?;
        }
        _ => anyhow::bail!("Unknown command: {}", name),
    }

    Ok(())
}
