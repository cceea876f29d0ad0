//! Application state and TUI event loop for the EV dashboard.
//!
//! [`App`] owns the theme, the analysed dataset and the table search state.
//! Key handling is kept separate from the terminal loop so it can be driven
//! directly in tests.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::debug;

use ev_data::analysis::DatasetAnalysis;
use ev_data::search::{self, SearchPage};

use crate::charts::{self, ChartSeries};
use crate::components::header::Header;
use crate::components::metric_card::{self, MetricCard};
use crate::table_view;
use crate::themes::Theme;

// ── InputMode ─────────────────────────────────────────────────────────────────

/// Whether typed characters go to the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub analysis: DatasetAnalysis,
    /// Dataset name shown in the header.
    pub source_label: String,
    pub search_term: String,
    pub input_mode: InputMode,
    /// Maximum rows in the vehicle table.
    pub table_limit: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, analysis: DatasetAnalysis, table_limit: usize) -> Self {
        let source_label = analysis
            .metadata
            .data_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| analysis.metadata.data_path.display().to_string());
        Self {
            theme: Theme::from_name(theme_name),
            analysis,
            source_label,
            search_term: String::new(),
            input_mode: InputMode::Normal,
            table_limit,
            should_quit: false,
        }
    }

    /// Start with `term` already in the search box.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Current page of the vehicle table.
    pub fn page(&self) -> SearchPage<'_> {
        search::search(&self.analysis.records, &self.search_term, self.table_limit)
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    /// Apply one key press to the state.
    ///
    /// `Ctrl+C` always quits. In normal mode `/` opens the search box, `Esc`
    /// clears the search and `q` quits; in search mode characters edit the
    /// term and `Enter` or `Esc` return to normal mode.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                KeyCode::Char('/') => self.input_mode = InputMode::Search,
                KeyCode::Esc => self.search_term.clear(),
                _ => {}
            },
            InputMode::Search => match key.code {
                KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
                KeyCode::Backspace => {
                    self.search_term.pop();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.search_term.push(c);
                }
                _ => {}
            },
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard TUI until the user quits.
    ///
    /// Polls `crossterm` with a 250 ms timeout and yields to the runtime
    /// between polls so a caller's `tokio::select!` can observe other events.
    pub async fn run_dashboard(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            tokio::task::yield_now().await;
        }

        debug!("dashboard loop finished");
        Ok(())
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the whole dashboard into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let report = &self.analysis.report;

        if self.analysis.records.is_empty() {
            table_view::render_no_data(frame, area, &self.theme);
            return;
        }

        let [header_area, cards_area, upper_charts, lower_charts, table_area, footer_area] =
            Layout::vertical([
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .areas(area);

        let header = Header::new(
            &self.source_label,
            report.rows_kept(),
            report.rows_dropped,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(header.to_lines()), header_area);

        let summary = &self.analysis.summary;
        let cards = MetricCard::from_summary(&summary.metrics);
        metric_card::render_metric_cards(frame, cards_area, &cards, &self.theme);

        let [makes_area, ranges_area] = split_columns(upper_charts);
        charts::render_horizontal_bar_chart(
            frame,
            makes_area,
            &ChartSeries::from_field_counts("Top Makes", &summary.top_makes),
            &self.theme,
        );
        charts::render_bar_chart(
            frame,
            ranges_area,
            &ChartSeries::from_buckets("Electric Range (mi)", &summary.range_distribution),
            &self.theme,
        );

        let [years_area, counties_area] = split_columns(lower_charts);
        charts::render_bar_chart(
            frame,
            years_area,
            &ChartSeries::from_years("Registrations by Model Year", &summary.year_trend),
            &self.theme,
        );
        charts::render_county_shares(
            frame,
            counties_area,
            &summary.county_distribution,
            summary.metrics.total_vehicles,
            &self.theme,
        );

        let page = self.page();
        table_view::render_vehicle_table(frame, table_area, &page, &self.search_term, &self.theme);

        frame.render_widget(Paragraph::new(self.footer_line()), footer_area);
    }

    fn footer_line(&self) -> Line<'_> {
        match self.input_mode {
            InputMode::Search => Line::from(vec![
                Span::styled("Search: ", self.theme.search_prompt),
                Span::styled(format!("{}█", self.search_term), self.theme.search_active),
                Span::styled("  [Enter/Esc] done", self.theme.dim),
            ]),
            InputMode::Normal => Line::from(Span::styled(
                "[/] search  [Esc] clear search  [q] quit",
                self.theme.dim,
            )),
        }
    }
}

fn split_columns(area: Rect) -> [Rect; 2] {
    Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
