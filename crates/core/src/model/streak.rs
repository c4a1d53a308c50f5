use chrono::NaiveDate;

/// Canonical on-disk date form.
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// `Date.prototype.toDateString()` output, e.g. `Sun Oct 18 2026`.
const LEGACY_DATE_FORMAT: &str = "%a %b %d %Y";

/// Count of calendar days with a completed daily challenge.
///
/// The count only moves forward: missed days never reset it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakState {
    streak_count: u32,
    last_completion_date: Option<NaiveDate>,
}

impl StreakState {
    #[must_use]
    pub fn new(streak_count: u32, last_completion_date: Option<NaiveDate>) -> Self {
        Self {
            streak_count,
            last_completion_date,
        }
    }

    #[must_use]
    pub fn streak_count(&self) -> u32 {
        self.streak_count
    }

    #[must_use]
    pub fn last_completion_date(&self) -> Option<NaiveDate> {
        self.last_completion_date
    }

    /// True if a completion has already been counted for `day`.
    #[must_use]
    pub fn completed_on(&self, day: NaiveDate) -> bool {
        self.last_completion_date == Some(day)
    }

    /// The state after completing a challenge on `today`.
    ///
    /// Returns `None` if `today` was already counted.
    #[must_use]
    pub fn advanced(&self, today: NaiveDate) -> Option<Self> {
        if self.completed_on(today) {
            return None;
        }
        Some(Self {
            streak_count: self.streak_count.saturating_add(1),
            last_completion_date: Some(today),
        })
    }
}

/// Render a completion date in its persisted form (`YYYY-MM-DD`).
#[must_use]
pub fn format_completion_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Parse a persisted completion date.
///
/// Accepts ISO dates and the legacy `toDateString()` form.
#[must_use]
pub fn parse_completion_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, LEGACY_DATE_FORMAT))
        .ok()
}
