use crate::models::quote::{NewsArticle, QuoteMetadata};
use crate::models::watchlist::Watchlist;
use crate::services::watch_service::ChartData;
use crate::ui::chart::ChartView;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::{self as term, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use ratatui::{Terminal, TerminalOptions, Viewport};
use std::io::{self, Write};

pub fn success<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.green())
}

pub fn notice<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.yellow())
}

pub fn failure<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.red())
}

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))
}

/// 终端宽度，获取失败时按 80 列处理
pub fn terminal_width() -> usize {
    terminal::size().map(|(cols, _)| cols as usize).unwrap_or(80)
}

pub fn print_watchlist<W: Write>(out: &mut W, watchlist: &Watchlist) -> io::Result<()> {
    if watchlist.is_empty() {
        return notice(out, "No stock symbols found. Please add stocks.");
    }
    writeln!(out, "{}", "Watchlist:".cyan())?;
    for (i, symbol) in watchlist.symbols().iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, symbol)?;
    }
    Ok(())
}

pub fn print_metadata<W: Write>(out: &mut W, meta: &QuoteMetadata) -> io::Result<()> {
    writeln!(out, "{}", format!("Stock Symbol: {}", meta.symbol).cyan())?;
    writeln!(out, "Last Refreshed: {}", meta.last_refreshed)?;
    writeln!(out, "Interval: {}", meta.interval)?;
    writeln!(out, "Output Size: {}", meta.output_size)?;
    writeln!(out, "Time Zone: {}", meta.time_zone)
}

pub fn print_news<W: Write>(out: &mut W, articles: &[NewsArticle]) -> io::Result<()> {
    if articles.is_empty() {
        return notice(out, "No news articles found.");
    }
    writeln!(out, "{}", "Stock News:".cyan())?;
    for article in articles {
        let published = article
            .published_at()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| article.time_published.clone());
        writeln!(out, "{} {}", "Title:".yellow(), article.title)?;
        writeln!(out, "{} {}", "Source:".green(), article.source)?;
        writeln!(out, "{} {}", "Published At:".blue(), published)?;
        writeln!(out, "{} {}", "Summary:".magenta(), article.summary)?;
        writeln!(out)?;
    }
    Ok(())
}

// 只处理图表里用到的几种颜色
fn term_color(color: Color) -> Option<term::Color> {
    match color {
        Color::Green => Some(term::Color::Green),
        Color::Red => Some(term::Color::Red),
        Color::Cyan => Some(term::Color::Cyan),
        Color::Yellow => Some(term::Color::Yellow),
        _ => None,
    }
}

/// 把缓冲区逐行写成带颜色的文本，相同颜色的连续单元合并输出，行尾空白去掉
fn print_buffer<W: Write>(out: &mut W, buf: &Buffer) -> io::Result<()> {
    let area = buf.area;
    for y in area.top()..area.bottom() {
        let cells: Vec<_> = (area.left()..area.right()).map(|x| &buf[(x, y)]).collect();
        let end = cells.iter().rposition(|c| c.symbol() != " ").map_or(0, |i| i + 1);

        let mut run = String::new();
        let mut run_color = None;
        for cell in &cells[..end] {
            let color = term_color(cell.fg);
            if color != run_color && !run.is_empty() {
                write_run(out, &run, run_color)?;
                run.clear();
            }
            run_color = color;
            run.push_str(cell.symbol());
        }
        write_run(out, &run, run_color)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_run<W: Write>(out: &mut W, text: &str, color: Option<term::Color>) -> io::Result<()> {
    match color {
        Some(color) => write!(out, "{}", text.with(color)),
        None => write!(out, "{}", text),
    }
}

/// 按给定宽度画出K线图和各周期均线，以文本形式输出
pub fn print_chart<W: Write>(out: &mut W, data: &ChartData, height: usize, width: usize) -> io::Result<()> {
    let view = ChartView::new(data, height);
    let width = width.clamp(1, u16::MAX as usize) as u16;
    let mut buf = Buffer::empty(Rect::new(0, 0, width, view.height()));
    let area = buf.area;
    (&view).render(area, &mut buf);
    print_buffer(out, &buf)
}

/// 在终端当前位置开一块内联视口直接绘制，不清屏，画完后光标移到图下方
pub fn draw_chart_inline<W: Write>(out: &mut W, data: &ChartData, height: usize) -> io::Result<()> {
    let view = ChartView::new(data, height);
    let rows = view.height();
    {
        let backend = CrosstermBackend::new(&mut *out);
        let mut terminal = Terminal::with_options(backend, TerminalOptions { viewport: Viewport::Inline(rows) })?;
        let bottom = terminal.draw(|f| f.render_widget(&view, f.area()))?.area.bottom();
        terminal.set_cursor_position((0, bottom.saturating_sub(1)))?;
    }
    writeln!(out)
}
