//! Month grids: 6 weeks of 7 days, starting on the Sunday on or before the first day of the month

use std::error::Error;

use bitflags::bitflags;
use chrono::{Datelike, Duration, NaiveDate};
use csscolorparser::Color;
use serde::{Deserialize, Serialize};

use super::summary::CalendarSummaries;

/// A grid always has this many cells, whatever the month
pub const GRID_CELLS: usize = 42;

bitflags! {
    #[derive(Serialize, Deserialize)]
    pub struct CellFlags: u8 {
        /// The day belongs to the displayed month (the others are greyed out)
        const IN_MONTH = 1;
        const TODAY = 2;
        /// The user clicked this day
        const SELECTED = 4;
    }
}

/// The status dot painted on days that have tasks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DotColor {
    /// Some tasks are overdue
    Overdue,
    /// Every task is completed
    Done,
    /// Some tasks remain, none is late
    Accent,
}

impl DotColor {
    pub fn css_class(&self) -> &'static str {
        match self {
            DotColor::Overdue => "bg-red-500",
            DotColor::Done => "bg-gray-300",
            DotColor::Accent => "bg-primary-500",
        }
    }
}

/// Actual colours of the status dots
#[derive(Clone, Debug, PartialEq)]
pub struct DotPalette {
    pub overdue: Color,
    pub done: Color,
    pub accent: Color,
}

impl Default for DotPalette {
    fn default() -> Self {
        Self {
            overdue: Color::from_rgb_u8(0xef, 0x44, 0x44),
            done: Color::from_rgb_u8(0xd1, 0xd5, 0xdb),
            accent: Color::from_rgb_u8(0x3b, 0x82, 0xf6),
        }
    }
}

impl DotPalette {
    /// Build a palette from CSS colour strings (`#ef4444`, `red`, `rgb(...)`...)
    pub fn from_css(overdue: &str, done: &str, accent: &str) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            overdue: csscolorparser::parse(overdue)?,
            done: csscolorparser::parse(done)?,
            accent: csscolorparser::parse(accent)?,
        })
    }

    pub fn color(&self, dot: DotColor) -> &Color {
        match dot {
            DotColor::Overdue => &self.overdue,
            DotColor::Done => &self.done,
            DotColor::Accent => &self.accent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct CellCounts {
    completed: u32,
    total: u32,
    overdue: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayCell {
    date: NaiveDate,
    flags: CellFlags,
    counts: Option<CellCounts>,
}

impl DayCell {
    pub fn date(&self) -> NaiveDate        { self.date }
    pub fn day(&self) -> u32               { self.date.day() }
    pub fn flags(&self) -> CellFlags       { self.flags }
    pub fn in_month(&self) -> bool         { self.flags.contains(CellFlags::IN_MONTH) }
    pub fn is_today(&self) -> bool         { self.flags.contains(CellFlags::TODAY) }
    pub fn is_selected(&self) -> bool      { self.flags.contains(CellFlags::SELECTED) }

    pub fn date_key(&self) -> String {
        crate::utils::date_key(self.date)
    }

    pub fn dot(&self) -> Option<DotColor> {
        self.counts.map(|c| {
            if c.overdue > 0 {
                DotColor::Overdue
            } else if c.completed >= c.total {
                DotColor::Done
            } else {
                DotColor::Accent
            }
        })
    }

    /// e.g. `1/3`, for days that have tasks
    pub fn caption(&self) -> Option<String> {
        self.counts.map(|c| format!("{}/{}", c.completed, c.total))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthGrid {
    /// First day of the displayed month
    month: NaiveDate,
    cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    /// e.g. `2026-10`
    pub fn label(&self) -> String {
        self.month.format("%Y-%m").to_string()
    }

    pub fn cells(&self) -> &[DayCell] {
        &self.cells
    }

    pub fn weeks(&self) -> std::slice::Chunks<'_, DayCell> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find(|c| c.date == date)
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn next_month(date: NaiveDate) -> NaiveDate {
    first_of_month(first_of_month(date) + Duration::days(32))
}

pub fn previous_month(date: NaiveDate) -> NaiveDate {
    first_of_month(first_of_month(date) - Duration::days(1))
}

/// Render the month `month` belongs to.
///
/// This is a pure function of its inputs, and always returns [`GRID_CELLS`] cells.
pub fn render_month(month: NaiveDate, summaries: &CalendarSummaries, today: NaiveDate, selected: Option<NaiveDate>) -> MonthGrid {
    let first = first_of_month(month);
    let start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);

    let cells = (0..GRID_CELLS)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            let mut flags = CellFlags::empty();
            flags.set(CellFlags::IN_MONTH, date.month() == first.month() && date.year() == first.year());
            flags.set(CellFlags::TODAY, date == today);
            flags.set(CellFlags::SELECTED, Some(date) == selected);
            let counts = summaries.get(date).map(|s| CellCounts {
                completed: s.completed,
                total: s.total,
                overdue: s.overdue,
            });
            DayCell { date, flags, counts }
        })
        .collect();

    MonthGrid { month: first, cells }
}
