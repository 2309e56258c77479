use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Controls what period the calendar/timeline displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    Week,
    #[default]
    Month,
    Quarter,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [Self::Day, Self::Week, Self::Month, Self::Quarter];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "d" => Ok(Self::Day),
            "week" | "w" => Ok(Self::Week),
            "month" | "m" => Ok(Self::Month),
            "quarter" | "q" => Ok(Self::Quarter),
            other => Err(format!("unknown view mode '{other}'")),
        }
    }
}

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when the two spans share at least one day.
    ///
    /// Equivalent to "starts inside, ends inside, or spans the whole
    /// window" for well-formed ranges.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Number of days covered, both ends inclusive.
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    /// Grow the range by `days` on both sides, stopping at the ends of the
    /// calendar.
    pub fn padded(&self, days: u32) -> Self {
        let pad = chrono::Duration::days(i64::from(days));
        Self::new(
            self.start.checked_sub_signed(pad).unwrap_or(NaiveDate::MIN),
            self.end.checked_add_signed(pad).unwrap_or(NaiveDate::MAX),
        )
    }
}

/// Ephemeral calendar-page state: view mode, anchor date and search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub mode: ViewMode,
    /// The anchor date the visible period is derived from.
    pub current_date: NaiveDate,
    pub search_term: String,
}

impl ViewState {
    pub fn new(mode: ViewMode, current_date: NaiveDate) -> Self {
        Self {
            mode,
            current_date,
            search_term: String::new(),
        }
    }

    /// Move the anchor one period forward (a day, a week, a month or a quarter).
    pub fn step_forward(&mut self) {
        self.current_date = shift(self.current_date, self.mode, true);
    }

    /// Move the anchor one period back.
    pub fn step_back(&mut self) {
        self.current_date = shift(self.current_date, self.mode, false);
    }

    pub fn go_to(&mut self, date: NaiveDate) {
        self.current_date = date;
    }

    /// Back to defaults, as when the calendar page is left and re-entered.
    pub fn reset(&mut self, mode: ViewMode, today: NaiveDate) {
        *self = Self::new(mode, today);
    }
}

fn shift(date: NaiveDate, mode: ViewMode, forward: bool) -> NaiveDate {
    let shifted = match mode {
        ViewMode::Day => {
            let step = chrono::Duration::days(1);
            if forward { date.checked_add_signed(step) } else { date.checked_sub_signed(step) }
        }
        ViewMode::Week => {
            let step = chrono::Duration::days(7);
            if forward { date.checked_add_signed(step) } else { date.checked_sub_signed(step) }
        }
        ViewMode::Month | ViewMode::Quarter => {
            let n = if mode == ViewMode::Month { 1 } else { 3 };
            if forward {
                date.checked_add_months(Months::new(n))
            } else {
                date.checked_sub_months(Months::new(n))
            }
        }
    };
    shifted.unwrap_or(date)
}
