use chrono::{Datelike, Duration, NaiveDate};

use crate::model::{DateRange, ViewMode};

/// Days added on each side of the resolved period before enumerating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Padding(pub u32);

impl Padding {
    pub const NONE: Padding = Padding(0);
    /// Resizable split-panel timeline.
    pub const SPLIT_PANEL: Padding = Padding(2);
    /// Simple single-scroll timeline.
    pub const SIMPLE: Padding = Padding(3);
}

impl Default for Padding {
    fn default() -> Self {
        Self::SPLIT_PANEL
    }
}

/// The period a view mode shows around an anchor date.
pub fn resolve_range(mode: ViewMode, anchor: NaiveDate) -> DateRange {
    match mode {
        ViewMode::Day => DateRange::single(anchor),
        ViewMode::Week => {
            let back = Duration::days(i64::from(anchor.weekday().num_days_from_monday()));
            let start = anchor.checked_sub_signed(back).unwrap_or(NaiveDate::MIN);
            let end = start.checked_add_signed(Duration::days(6)).unwrap_or(NaiveDate::MAX);
            DateRange::new(start, end)
        }
        ViewMode::Month => {
            let start = first_of_month(anchor.year(), anchor.month()).unwrap_or(anchor);
            DateRange::new(start, last_of_month(start))
        }
        ViewMode::Quarter => {
            let first_month = (anchor.month0() / 3) * 3 + 1;
            let start = first_of_month(anchor.year(), first_month).unwrap_or(anchor);
            let last_month_start =
                first_of_month(anchor.year(), first_month + 2).unwrap_or(start);
            DateRange::new(start, last_of_month(last_month_start))
        }
    }
}

/// Resolve and pad the period, then enumerate its days.
pub fn display_dates(mode: ViewMode, anchor: NaiveDate, padding: Padding) -> DisplayDates {
    DisplayDates::new(resolve_range(mode, anchor).padded(padding.0))
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    first_of_month(y, m)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Every calendar day of a window, in order, both ends inclusive.
///
/// Lazy and finite; cloning gives an independent cursor, [`restart`]
/// rewinds in place.
///
/// [`restart`]: DisplayDates::restart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDates {
    window: DateRange,
    pos: i64,
}

impl DisplayDates {
    pub fn new(window: DateRange) -> Self {
        Self { window, pos: 0 }
    }

    /// The padded window being enumerated.
    pub fn window(&self) -> DateRange {
        self.window
    }

    /// Total number of days in the window, regardless of cursor position.
    pub fn total(&self) -> usize {
        usize::try_from(self.window.days()).unwrap_or(0)
    }

    pub fn restart(&mut self) {
        self.pos = 0;
    }

    /// Column index of a date, if it lies in the window.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if self.window.contains(date) {
            usize::try_from((date - self.window.start).num_days()).ok()
        } else {
            None
        }
    }

    /// Date at a column index.
    pub fn get(&self, index: usize) -> Option<NaiveDate> {
        let offset = i64::try_from(index).ok()?;
        if offset < self.window.days() {
            self.window.start.checked_add_signed(Duration::days(offset))
        } else {
            None
        }
    }
}

impl Iterator for DisplayDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.pos >= self.window.days() {
            return None;
        }
        let date = self.window.start.checked_add_signed(Duration::days(self.pos))?;
        self.pos += 1;
        Some(date)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.window.days() - self.pos).unwrap_or(0);
        (left, Some(left))
    }
}

impl ExactSizeIterator for DisplayDates {}
