use ev_core::formatting::{format_count, format_miles, format_percent};
use ev_data::aggregator::NO_DATA_LABEL;
use ev_data::analysis::MetricSummary;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::themes::Theme;

/// One headline figure in a bordered box.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    /// Secondary line under the value.
    pub detail: Option<String>,
}

impl MetricCard {
    pub fn new(title: &'static str, value: impl Into<String>) -> Self {
        Self {
            title,
            value: value.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The dashboard's card row, in display order.
    pub fn from_summary(metrics: &MetricSummary) -> Vec<MetricCard> {
        vec![
            MetricCard::new("Total Vehicles", format_count(metrics.total_vehicles)),
            MetricCard::new("Average Range", format_miles(metrics.average_range))
                .with_detail("reported ranges only"),
            MetricCard::new("Top Make", metrics.top_make.clone()),
            MetricCard::new(
                "Latest Model Year",
                metrics
                    .latest_model_year
                    .map_or_else(|| NO_DATA_LABEL.to_string(), |y| y.to_string()),
            ),
            MetricCard::new("CAFV Eligible", format_percent(metrics.eligible_percent))
                .with_detail(format!("{} vehicles", format_count(metrics.eligible_count))),
            MetricCard::new("Counties", format_count(metrics.unique_counties)),
        ]
    }

    pub fn to_lines<'a>(&'a self, theme: &Theme) -> Vec<Line<'a>> {
        let mut lines = vec![Line::from(Span::styled(self.value.as_str(), theme.card_value))];
        if let Some(detail) = &self.detail {
            lines.push(Line::from(Span::styled(detail.as_str(), theme.dim)));
        }
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.card_border)
            .title(Span::styled(format!(" {} ", self.title), theme.card_title));
        frame.render_widget(
            Paragraph::new(self.to_lines(theme))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
    }
}

/// Lay `cards` out side by side in equal columns.
pub fn render_metric_cards(frame: &mut Frame, area: Rect, cards: &[MetricCard], theme: &Theme) {
    if cards.is_empty() {
        return;
    }
    let columns = Layout::horizontal(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
        .split(area);
    for (card, column) in cards.iter().zip(columns.iter()) {
        card.render(frame, *column, theme);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
