//! Chart panels for the dashboard: top makes, range distribution, model-year
//! trend, and county shares.

use ev_core::formatting::{format_count, percentage};
use ev_data::aggregator::{BucketCount, FieldCount, YearCount};
use ratatui::{
    layout::{Direction, Rect},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

/// Width of the share bar in the county panel.
const SHARE_BAR_WIDTH: usize = 20;

/// Labelled values ready to be drawn as bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    pub title: String,
    pub points: Vec<(String, u64)>,
}

impl ChartSeries {
    pub fn from_field_counts(title: &str, counts: &[FieldCount]) -> Self {
        Self {
            title: title.to_string(),
            points: counts
                .iter()
                .map(|c| (display_label(&c.name), c.value as u64))
                .collect(),
        }
    }

    pub fn from_buckets(title: &str, buckets: &[BucketCount]) -> Self {
        Self {
            title: title.to_string(),
            points: buckets
                .iter()
                .map(|b| (b.label.clone(), b.count as u64))
                .collect(),
        }
    }

    pub fn from_years(title: &str, years: &[YearCount]) -> Self {
        Self {
            title: title.to_string(),
            points: years
                .iter()
                .map(|y| (y.year.to_string(), y.count as u64))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.iter().all(|(_, v)| *v == 0)
    }
}

/// Empty group names are shown as `(blank)`.
fn display_label(name: &str) -> String {
    if name.is_empty() {
        "(blank)".to_string()
    } else {
        name.to_string()
    }
}

fn panel<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.card_border)
        .title(Span::styled(format!(" {title} "), theme.card_title))
}

fn render_empty(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled("No data", theme.dim))).block(panel(title, theme)),
        area,
    );
}

// ── Bar charts ────────────────────────────────────────────────────────────────

/// Vertical bars sized to fill the panel width.
pub fn render_bar_chart(frame: &mut Frame, area: Rect, series: &ChartSeries, theme: &Theme) {
    if series.is_empty() {
        render_empty(frame, area, &series.title, theme);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let n = series.points.len().max(1);
    let bar_width = (inner_width / n).saturating_sub(1).clamp(1, 12) as u16;

    let bars: Vec<Bar> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::default()
                .value(*value)
                .text_value(format_count(*value as usize))
                .label(Line::from(label.clone()))
                .style(theme.bar_style(i))
                .value_style(theme.chart_value)
        })
        .collect();

    let chart = BarChart::default()
        .block(panel(&series.title, theme))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .label_style(theme.chart_label);
    frame.render_widget(chart, area);
}

/// Horizontal bars, for series whose labels are too long to sit under a bar.
pub fn render_horizontal_bar_chart(
    frame: &mut Frame,
    area: Rect,
    series: &ChartSeries,
    theme: &Theme,
) {
    if series.is_empty() {
        render_empty(frame, area, &series.title, theme);
        return;
    }

    let bars: Vec<Bar> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::default()
                .value(*value)
                .text_value(format_count(*value as usize))
                .label(Line::from(label.clone()))
                .style(theme.bar_style(i))
                .value_style(theme.chart_value)
        })
        .collect();

    let chart = BarChart::default()
        .block(panel(&series.title, theme))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .label_style(theme.chart_label);
    frame.render_widget(chart, area);
}

// ── County shares ─────────────────────────────────────────────────────────────

/// One `name  pct%  ████` line per county entry.
pub fn county_share_lines<'a>(counties: &[FieldCount], total: usize, theme: &Theme) -> Vec<Line<'a>> {
    let name_width = counties
        .iter()
        .map(|c| display_label(&c.name).width())
        .max()
        .unwrap_or(0);

    counties
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let name = display_label(&c.name);
            let pad = name_width.saturating_sub(name.width());
            let pct = percentage(c.value as f64, total as f64, 1);
            let filled = ((pct / 100.0) * SHARE_BAR_WIDTH as f64).round() as usize;
            Line::from(vec![
                Span::styled(format!("{name}{}", " ".repeat(pad)), theme.label),
                Span::styled(format!(" {pct:>5.1}% "), theme.value),
                Span::styled("█".repeat(filled.min(SHARE_BAR_WIDTH)), theme.bar_style(i)),
            ])
        })
        .collect()
}

pub fn render_county_shares(
    frame: &mut Frame,
    area: Rect,
    counties: &[FieldCount],
    total: usize,
    theme: &Theme,
) {
    let title = "Vehicles by County";
    if counties.is_empty() {
        render_empty(frame, area, title, theme);
        return;
    }
    frame.render_widget(
        Paragraph::new(county_share_lines(counties, total, theme)).block(panel(title, theme)),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
