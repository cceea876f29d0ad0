use std::sync::OnceLock;

use regex::Regex;

// ── Coerced ───────────────────────────────────────────────────────────────────

/// Outcome of coercing one raw cell into a typed value.
///
/// Both variants carry a usable value; `Defaulted` marks that the cell was
/// absent, empty, or unparseable and the fallback was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerced<T> {
    Parsed(T),
    Defaulted(T),
}

impl<T> Coerced<T> {
    /// The value regardless of how it was obtained.
    pub fn into_value(self) -> T {
        match self {
            Coerced::Parsed(v) | Coerced::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Coerced::Defaulted(_))
    }
}

// ── FieldParser ───────────────────────────────────────────────────────────────

/// Lenient cell coercion used by dataset ingestion. Never fails.
pub struct FieldParser;

impl FieldParser {
    /// Text cell: absent or empty becomes `""`.
    pub fn text(raw: Option<&str>) -> String {
        raw.unwrap_or_default().to_string()
    }

    /// Integer cell with leading-number semantics.
    ///
    /// Leading whitespace is skipped, an optional sign and the run of decimal
    /// digits that follows are consumed, and anything after is ignored:
    /// `"2022"` → 2022, `" 150 mi"` → 150, `"-3x"` → -3.
    /// No digits, or a value outside `i64`, yields `Defaulted(0)`.
    pub fn integer(raw: Option<&str>) -> Coerced<i64> {
        raw.and_then(Self::leading_integer)
            .map_or(Coerced::Defaulted(0), Coerced::Parsed)
    }

    fn leading_integer(s: &str) -> Option<i64> {
        static LEADING_INT: OnceLock<Regex> = OnceLock::new();
        let re = LEADING_INT.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").expect("regex is valid"));
        let digits = re.captures(s)?.get(1)?.as_str();
        digits.parse::<i64>().ok()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
