//! Searchable vehicle table for the dashboard.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per matching
//! record, type and eligibility badges, and a "showing N of M" caption.

use ev_core::models::VehicleRecord;
use ev_data::search::SearchPage;
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::themes::Theme;

const COLUMNS: [(&str, u16); 9] = [
    ("VIN", 10),
    ("Year", 4),
    ("Make", 12),
    ("Model", 14),
    ("Type", 5),
    ("Range", 6),
    ("CAFV", 12),
    ("City", 14),
    ("County", 12),
];

/// Cut `text` to at most `max_width` display columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let budget = max_width - 1;
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Range cell text; unreported ranges show as `-`.
fn range_cell(record: &VehicleRecord) -> String {
    record
        .known_range()
        .map_or_else(|| "-".to_string(), |r| r.to_string())
}

fn year_cell(record: &VehicleRecord) -> String {
    record
        .known_model_year()
        .map_or_else(|| "-".to_string(), |y| y.to_string())
}

fn vehicle_row<'a>(index: usize, record: &VehicleRecord, theme: &Theme) -> Row<'a> {
    let fit = |text: &str, col: usize| truncate_to_width(text, COLUMNS[col].1 as usize);
    let vehicle_type = record.vehicle_type();
    let eligibility = record.eligibility();
    let style = if index % 2 == 0 {
        theme.table_row
    } else {
        theme.table_row_alt
    };

    Row::new(vec![
        Cell::from(fit(&record.vin, 0)),
        Cell::from(year_cell(record)),
        Cell::from(fit(&record.make, 2)),
        Cell::from(fit(&record.model, 3)),
        Cell::from(Span::styled(
            vehicle_type.short_label(),
            theme.vehicle_type_style(vehicle_type),
        )),
        Cell::from(range_cell(record)),
        Cell::from(Span::styled(
            fit(eligibility.label(), 6),
            theme.eligibility_style(eligibility),
        )),
        Cell::from(fit(&record.city, 7)),
        Cell::from(fit(&record.county, 8)),
    ])
    .style(style)
}

/// Render one page of search results into `area`.
///
/// `search_term` is echoed in the title when non-empty.
pub fn render_vehicle_table(
    frame: &mut Frame,
    area: Rect,
    page: &SearchPage<'_>,
    search_term: &str,
    theme: &Theme,
) {
    let header = Row::new(
        COLUMNS
            .iter()
            .map(|(name, _)| Cell::from(*name).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = page
        .rows
        .iter()
        .enumerate()
        .map(|(i, record)| vehicle_row(i, record, theme))
        .collect();

    let widths = COLUMNS.map(|(_, w)| Constraint::Length(w));

    let title = if search_term.is_empty() {
        " Vehicles ".to_string()
    } else {
        format!(" Vehicles matching \"{search_term}\" ")
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title)
                .title_bottom(Line::from(Span::styled(format!(" {} ", page.caption()), theme.dim))),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder shown when the dataset has no records at all.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No vehicle records found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Check the --data path and the CSV header row.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" EV Dashboard "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ev_data::search::search;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_records() -> Vec<VehicleRecord> {
        vec![
            VehicleRecord {
                vin: "5YJ3E1EB0K".to_string(),
                model_year: 2019,
                make: "TESLA".to_string(),
                model: "MODEL 3".to_string(),
                electric_vehicle_type: "Battery Electric Vehicle (BEV)".to_string(),
                electric_range: 220,
                cafv_eligibility: "Clean Alternative Fuel Vehicle Eligible".to_string(),
                city: "Seattle".to_string(),
                county: "King".to_string(),
                ..Default::default()
            },
            VehicleRecord {
                vin: "JTDKARFP1L".to_string(),
                model_year: 2020,
                make: "TOYOTA".to_string(),
                model: "PRIUS PRIME".to_string(),
                electric_vehicle_type: "Plug-in Hybrid Electric Vehicle (PHEV)".to_string(),
                electric_range: 25,
                cafv_eligibility: "Not eligible due to low battery range".to_string(),
                city: "Yakima".to_string(),
                county: "Yakima".to_string(),
                ..Default::default()
            },
        ]
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    // ── truncate_to_width ─────────────────────────────────────────────────────

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_to_width("KIA", 12), "KIA");
        assert_eq!(truncate_to_width("", 0), "");
    }

    #[test]
    fn test_truncate_long_text_gets_ellipsis() {
        let out = truncate_to_width("MUSTANG MACH-E", 8);
        assert_eq!(out, "MUSTANG…");
        assert_eq!(out.width(), 8);
    }

    #[test]
    fn test_truncate_wide_characters() {
        // Each CJK character is two columns wide.
        let out = truncate_to_width("東京都港区", 5);
        assert_eq!(out, "東京…");
        assert!(out.width() <= 5);
    }

    #[test]
    fn test_truncate_zero_width() {
        assert_eq!(truncate_to_width("TESLA", 0), "");
    }

    // ── cells ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_range_and_year_cells() {
        let record = VehicleRecord::default();
        assert_eq!(range_cell(&record), "-");
        assert_eq!(year_cell(&record), "-");
        let records = make_records();
        assert_eq!(range_cell(&records[0]), "220");
        assert_eq!(year_cell(&records[0]), "2019");
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_vehicle_table_shows_rows_and_caption() {
        let backend = TestBackend::new(130, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let records = make_records();
        let page = search(&records, "", 10);

        terminal
            .draw(|frame| render_vehicle_table(frame, frame.area(), &page, "", &theme))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("TESLA"));
        assert!(text.contains("PHEV"));
        assert!(text.contains("Not Eligible"));
        assert!(text.contains("showing 2 of 2 filtered records"));
    }

    #[test]
    fn test_render_vehicle_table_echoes_search_term() {
        let backend = TestBackend::new(130, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let records = make_records();
        let page = search(&records, "yakima", 10);

        terminal
            .draw(|frame| render_vehicle_table(frame, frame.area(), &page, "yakima", &theme))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Vehicles matching \"yakima\""));
        assert!(text.contains("showing 1 of 1 filtered records"));
        assert!(!text.contains("TESLA"));
    }

    #[test]
    fn test_render_vehicle_table_empty_page_does_not_panic() {
        let backend = TestBackend::new(80, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();
        let records: Vec<VehicleRecord> = vec![];
        let page = search(&records, "nothing", 10);

        terminal
            .draw(|frame| render_vehicle_table(frame, frame.area(), &page, "nothing", &theme))
            .unwrap();
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| render_no_data(frame, frame.area(), &theme))
            .unwrap();
    }
}
