use crate::themes::Theme;
use ev_core::formatting::format_count;
use ratatui::text::{Line, Span};

pub const TITLE: &str = "ELECTRIC VEHICLE POPULATION DASHBOARD";

/// Dashboard header rendering four lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. Dataset line in `[ source | N records | M dropped ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Display name of the loaded dataset (usually the file name).
    pub source: &'a str,
    pub records: usize,
    /// Rows dropped during ingestion.
    pub dropped: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source: &'a str, records: usize, dropped: usize, theme: &'a Theme) -> Self {
        Self {
            source,
            records,
            dropped,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let dropped_style = if self.dropped > 0 {
            self.theme.warning
        } else {
            self.theme.value
        };

        vec![
            Line::from(Span::styled(TITLE, self.theme.header)),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.source, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(format!("{} records", format_count(self.records)), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(format!("{} dropped", format_count(self.dropped)), dropped_style),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
