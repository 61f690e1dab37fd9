//! 用 ratatui 绘制K线图和均线图。
//!
//! `ChartView` 只负责往 `Buffer` 里画，输出到终端还是写成文本由 `ui::report` 决定。

use crate::models::quote::PriceBar;
use crate::services::watch_service::ChartData;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::canvas::{self, Canvas};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget};

/// 价格轴标签宽度
pub const LABEL_WIDTH: u16 = 11;

pub const UP: Color = Color::Green;
pub const DOWN: Color = Color::Red;
pub const AVERAGE: Color = Color::Cyan;
pub const NOTICE: Color = Color::Yellow;

pub struct ChartView<'a> {
    data: &'a ChartData,
    candle_height: u16,
    average_height: u16,
}

impl<'a> ChartView<'a> {
    /// `height` 是K线区域的行数，均线区域取一半
    pub fn new(data: &'a ChartData, height: usize) -> Self {
        let candle_height = height.clamp(2, u16::MAX as usize / 4) as u16;
        Self {
            data,
            candle_height,
            average_height: (candle_height / 2).max(2),
        }
    }

    /// 整张图需要的总行数
    pub fn height(&self) -> u16 {
        self.layout_heights().iter().sum()
    }

    fn title_lines(&self) -> u16 {
        if self.data.series.is_empty() { 1 } else { 2 }
    }

    fn layout_heights(&self) -> Vec<u16> {
        let mut heights = vec![self.title_lines(), self.candle_height];
        for (_, values) in &self.data.averages {
            heights.push(1);
            if !values.is_empty() {
                heights.push(self.average_height);
            }
        }
        heights
    }

    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        let bars = &self.data.series.bars;
        let mut lines = vec![Line::styled(
            format!("Candlestick Chart for {}", self.data.symbol),
            Style::default().fg(AVERAGE),
        )];
        if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
            lines.push(Line::raw(format!("{} bars, {} .. {}", bars.len(), first.timestamp, last.timestamp)));
        }
        Paragraph::new(lines).render(area, buf);
    }

    fn render_candles(&self, area: Rect, buf: &mut Buffer) {
        let [labels, plot] = Layout::horizontal([Constraint::Length(LABEL_WIDTH), Constraint::Min(1)]).areas(area);
        let bars = tail(&self.data.series.bars, plot.width as usize);
        if bars.is_empty() {
            return;
        }

        let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let (low, high) = padded(low, high);
        Paragraph::new(price_labels(low, high, area.height)).render(labels, buf);

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, bars.len() as f64])
            .y_bounds([low, high])
            .paint(|ctx| {
                for (i, bar) in bars.iter().enumerate() {
                    let x = i as f64;
                    let color = if bar.is_bullish() { UP } else { DOWN };
                    // 影线占左半格，实体占满一格
                    ctx.draw(&canvas::Line::new(x + 0.25, bar.low, x + 0.25, bar.high, color));
                    for offset in [0.25, 0.75] {
                        ctx.draw(&canvas::Line::new(x + offset, bar.body_bottom(), x + offset, bar.body_top(), color));
                    }
                }
            })
            .render(plot, buf);
    }

    fn render_average(&self, values: &[f64], area: Rect, buf: &mut Buffer) {
        let values = tail(values, area.width.saturating_sub(LABEL_WIDTH).max(1) as usize);
        let points: Vec<(f64, f64)> = values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect();
        let low = values.iter().copied().fold(f64::INFINITY, f64::min);
        let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (low, high) = padded(low, high);

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(AVERAGE))
            .data(&points);
        Chart::new(vec![dataset])
            .x_axis(Axis::default().bounds([0.0, (points.len().max(2) - 1) as f64]))
            .y_axis(
                Axis::default()
                    .bounds([low, high])
                    .labels([format!("{:.2}", low), format!("{:.2}", high)]),
            )
            .legend_position(None)
            .render(area, buf);
    }
}

impl Widget for &ChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let heights = self.layout_heights();
        let areas = Layout::vertical(heights.iter().map(|h| Constraint::Length(*h))).split(area);
        let bar_count = self.data.series.len();

        self.render_title(areas[0], buf);
        self.render_candles(areas[1], buf);

        let mut next = 2;
        for (window, values) in &self.data.averages {
            let Some(header) = areas.get(next) else {
                break;
            };
            next += 1;
            if values.is_empty() {
                Paragraph::new(Line::styled(
                    format!("MA{}: not enough data ({} bars)", window, bar_count),
                    Style::default().fg(NOTICE),
                ))
                .render(*header, buf);
                continue;
            }

            let latest = values[values.len() - 1];
            Paragraph::new(Line::styled(
                format!("MA{} (latest {:.2})", window, latest),
                Style::default().fg(AVERAGE),
            ))
            .render(*header, buf);
            if let Some(plot) = areas.get(next) {
                self.render_average(values, *plot, buf);
            }
            next += 1;
        }
    }
}

fn tail<T>(items: &[T], width: usize) -> &[T] {
    &items[items.len().saturating_sub(width)..]
}

// 最高价等于最低价时上下各留 1，避免坐标轴区间为零
fn padded(low: f64, high: f64) -> (f64, f64) {
    if high > low { (low, high) } else { (low - 1.0, high + 1.0) }
}

/// 顶部最高价、中间价、底部最低价，其余行留空
fn price_labels(low: f64, high: f64, rows: u16) -> Vec<Line<'static>> {
    let rows = rows as usize;
    let mut lines = vec![Line::raw(""); rows];
    if rows == 0 {
        return lines;
    }
    lines[rows / 2] = Line::raw(format!("{:>9.2} ┤", (low + high) / 2.0));
    lines[0] = Line::raw(format!("{:>9.2} ┤", high));
    lines[rows - 1] = Line::raw(format!("{:>9.2} ┤", low));
    lines
}
