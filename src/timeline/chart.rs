use chrono::NaiveDate;

use crate::model::{DateRange, GanttTask};

/// Days of empty axis kept before the earliest and after the latest entry.
pub const DEFAULT_BUFFER_DAYS: u32 = 5;
/// Narrowest a day column may get, in pixels.
pub const MIN_DAY_WIDTH: f32 = 40.0;

/// Horizontal placement of one bar, in pixels from the chart's left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub left: f32,
    pub width: f32,
    /// Whole days from the chart start to the entry start.
    pub offset_days: i64,
    /// Days covered, both ends inclusive; zero for a reversed entry.
    pub span_days: i64,
}

impl BarGeometry {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn is_empty(&self) -> bool {
        self.span_days == 0
    }
}

/// Continuous date axis for free-positioned bars.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    /// The leftmost date on the axis.
    pub start: NaiveDate,
    /// The rightmost date on the axis.
    pub end: NaiveDate,
    /// Pixels per day.
    pub day_width: f32,
}

impl ChartLayout {
    pub fn new(start: NaiveDate, end: NaiveDate, day_width: f32) -> Self {
        Self {
            start,
            end,
            day_width,
        }
    }

    /// Fit an axis around `tasks`: earliest start and latest end, each pushed
    /// out by `buffer_days`, with the container width shared between the days
    /// but never below `min_day_width`. `None` when there is nothing to lay out.
    pub fn for_tasks<'a, I>(
        tasks: I,
        buffer_days: u32,
        container_width: f32,
        min_day_width: f32,
    ) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GanttTask>,
    {
        let (first, last) = tasks.into_iter().fold(None, |acc: Option<(NaiveDate, NaiveDate)>, t| {
            Some(match acc {
                None => (t.start, t.end),
                Some((lo, hi)) => (lo.min(t.start), hi.max(t.end)),
            })
        })?;
        let axis = DateRange::new(first, last.max(first)).padded(buffer_days);
        let days = axis.days().max(1) as f32;
        let day_width = (container_width / days).max(min_day_width);
        Some(Self::new(axis.start, axis.end, day_width))
    }

    /// Number of day columns on the axis.
    pub fn days(&self) -> i64 {
        DateRange::new(self.start, self.end).days()
    }

    /// Convert a date to an x-pixel offset from the chart start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        (date - self.start).num_days() as f32 * self.day_width
    }

    /// Convert an x-pixel offset back to the day column it falls in.
    ///
    /// Offsets past either end of the calendar saturate at
    /// [`NaiveDate::MIN`]/[`NaiveDate::MAX`]. A non-positive day width maps
    /// everything to the chart start.
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        if self.day_width.is_nan() || self.day_width <= 0.0 {
            return self.start;
        }
        let span = (NaiveDate::MAX - NaiveDate::MIN).num_days();
        let days = ((x / self.day_width).floor() as i64).clamp(-span, span);
        let delta = chrono::Duration::days(days);
        match self.start.checked_add_signed(delta) {
            Some(date) => date,
            None if days < 0 => NaiveDate::MIN,
            None => NaiveDate::MAX,
        }
    }

    /// Total width in pixels for the whole axis.
    pub fn total_width(&self) -> f32 {
        self.days() as f32 * self.day_width
    }

    /// Place a bar. Both ends are inclusive days, so a one-day entry is one
    /// column wide.
    pub fn bar(&self, task: &GanttTask) -> BarGeometry {
        let offset_days = (task.start - self.start).num_days();
        let span_days = task.duration_days();
        BarGeometry {
            left: offset_days as f32 * self.day_width,
            width: span_days as f32 * self.day_width,
            offset_days,
            span_days,
        }
    }
}

/// Text drawn inside a bar: the percentage, or a check mark once done.
pub fn progress_label(progress: u8) -> String {
    if progress < 100 {
        format!("{progress}%")
    } else {
        "✓".to_string()
    }
}
