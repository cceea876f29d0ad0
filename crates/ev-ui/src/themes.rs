use ev_core::models::{Eligibility, VehicleType};
use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect the terminal background from `COLORFGBG` (`"fg;bg"`).
///
/// Background values 0–6 are dark, anything else parseable is light. Absent or
/// unparseable values fall back to `Dark`.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .and_then(background_from_colorfgbg)
        .unwrap_or(BackgroundType::Dark)
}

fn background_from_colorfgbg(val: &str) -> Option<BackgroundType> {
    let bg = val.split(';').next_back()?.parse::<u8>().ok()?;
    Some(if bg <= 6 {
        BackgroundType::Dark
    } else {
        BackgroundType::Light
    })
}

/// Every style the dashboard widgets draw with.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub warning: Style,

    // ── Metric cards ─────────────────────────────────────────────────────────
    pub card_border: Style,
    pub card_title: Style,
    pub card_value: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub chart_bar: Style,
    /// Alternate bar colour so neighbouring bars stay distinguishable.
    pub chart_bar_alt: Style,
    pub chart_value: Style,
    pub chart_label: Style,

    // ── Badges ───────────────────────────────────────────────────────────────
    pub badge_bev: Style,
    pub badge_phev: Style,
    pub badge_eligible: Style,
    pub badge_not_eligible: Style,
    pub badge_neutral: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,

    // ── Search ───────────────────────────────────────────────────────────────
    pub search_prompt: Style,
    pub search_active: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),

            warning: Style::default().fg(Color::Yellow),

            card_border: Style::default().fg(Color::DarkGray),
            card_title: Style::default().fg(Color::Gray),
            card_value: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),

            chart_bar: Style::default().fg(Color::Green),
            chart_bar_alt: Style::default().fg(Color::LightGreen),
            chart_value: Style::default().fg(Color::Black).bg(Color::Green),
            chart_label: Style::default().fg(Color::Gray),

            badge_bev: Style::default().fg(Color::Black).bg(Color::Green),
            badge_phev: Style::default().fg(Color::Black).bg(Color::Yellow),
            badge_eligible: Style::default().fg(Color::Green),
            badge_not_eligible: Style::default().fg(Color::Red),
            badge_neutral: Style::default().fg(Color::Gray),

            table_header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),

            search_prompt: Style::default().fg(Color::Gray),
            search_active: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),

            warning: Style::default().fg(Color::Yellow),

            card_border: Style::default().fg(Color::Gray),
            card_title: Style::default().fg(Color::DarkGray),
            card_value: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),

            chart_bar: Style::default().fg(Color::Blue),
            chart_bar_alt: Style::default().fg(Color::LightBlue),
            chart_value: Style::default().fg(Color::White).bg(Color::Blue),
            chart_label: Style::default().fg(Color::DarkGray),

            badge_bev: Style::default().fg(Color::White).bg(Color::Green),
            badge_phev: Style::default().fg(Color::Black).bg(Color::Yellow),
            badge_eligible: Style::default().fg(Color::Green),
            badge_not_eligible: Style::default().fg(Color::Red),
            badge_neutral: Style::default().fg(Color::DarkGray),

            table_header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),

            search_prompt: Style::default().fg(Color::DarkGray),
            search_active: Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        }
    }

    /// Basic 8-colour ANSI palette, no bold and no background fills.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            warning: Style::default().fg(Color::Yellow),

            card_border: Style::default().fg(Color::White),
            card_title: Style::default().fg(Color::Gray),
            card_value: Style::default().fg(Color::Cyan),

            chart_bar: Style::default().fg(Color::Green),
            chart_bar_alt: Style::default().fg(Color::Cyan),
            chart_value: Style::default().fg(Color::White),
            chart_label: Style::default().fg(Color::White),

            badge_bev: Style::default().fg(Color::Green),
            badge_phev: Style::default().fg(Color::Yellow),
            badge_eligible: Style::default().fg(Color::Green),
            badge_not_eligible: Style::default().fg(Color::Red),
            badge_neutral: Style::default().fg(Color::White),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),

            search_prompt: Style::default().fg(Color::Gray),
            search_active: Style::default().fg(Color::Yellow),
        }
    }

    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name. Unknown names (including `"auto"`) detect.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    pub fn vehicle_type_style(&self, vehicle_type: VehicleType) -> Style {
        match vehicle_type {
            VehicleType::Bev => self.badge_bev,
            VehicleType::Phev => self.badge_phev,
            VehicleType::Other => self.badge_neutral,
        }
    }

    pub fn eligibility_style(&self, eligibility: Eligibility) -> Style {
        match eligibility {
            Eligibility::Eligible => self.badge_eligible,
            Eligibility::NotEligible => self.badge_not_eligible,
            Eligibility::Unknown => self.badge_neutral,
        }
    }

    /// Bar style for the `index`-th bar of a chart, alternating.
    pub fn bar_style(&self, index: usize) -> Style {
        if index % 2 == 0 {
            self.chart_bar
        } else {
            self.chart_bar_alt
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Theme construction ───────────────────────────────────────────────────

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.badge_eligible.fg, Some(Color::Green));
        assert_eq!(t.badge_bev.bg, Some(Color::Green));
        assert_eq!(t.badge_phev.bg, Some(Color::Yellow));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.chart_bar.fg, Some(Color::Blue));
    }

    #[test]
    fn test_classic_theme_has_no_bold_or_fills() {
        let t = Theme::classic();
        assert!(!t.header.add_modifier.contains(Modifier::BOLD));
        assert!(!t.card_value.add_modifier.contains(Modifier::BOLD));
        assert_eq!(t.badge_bev.bg, None);
        assert_eq!(t.chart_value.bg, None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        assert!(!Theme::from_name("classic")
            .header
            .add_modifier
            .contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("auto");
        assert!(t.header.fg.is_some());
    }

    // ── COLORFGBG parsing ────────────────────────────────────────────────────

    #[test]
    fn test_background_from_colorfgbg() {
        assert_eq!(background_from_colorfgbg("15;0"), Some(BackgroundType::Dark));
        assert_eq!(background_from_colorfgbg("0;15"), Some(BackgroundType::Light));
        assert_eq!(background_from_colorfgbg("0;default;7"), Some(BackgroundType::Light));
        assert_eq!(background_from_colorfgbg("garbage"), None);
        assert_eq!(background_from_colorfgbg(""), None);
    }

    // ── Badge helpers ────────────────────────────────────────────────────────

    #[test]
    fn test_vehicle_type_style() {
        let t = Theme::dark();
        assert_eq!(t.vehicle_type_style(VehicleType::Bev), t.badge_bev);
        assert_eq!(t.vehicle_type_style(VehicleType::Phev), t.badge_phev);
        assert_eq!(t.vehicle_type_style(VehicleType::Other), t.badge_neutral);
    }

    #[test]
    fn test_eligibility_style() {
        let t = Theme::dark();
        assert_eq!(t.eligibility_style(Eligibility::Eligible).fg, Some(Color::Green));
        assert_eq!(t.eligibility_style(Eligibility::NotEligible).fg, Some(Color::Red));
        assert_eq!(t.eligibility_style(Eligibility::Unknown), t.badge_neutral);
    }

    #[test]
    fn test_bar_style_alternates() {
        let t = Theme::dark();
        assert_eq!(t.bar_style(0), t.chart_bar);
        assert_eq!(t.bar_style(1), t.chart_bar_alt);
        assert_eq!(t.bar_style(2), t.chart_bar);
    }
}
