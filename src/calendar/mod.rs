//! The month calendar shown next to the task list

use chrono::NaiveDate;

pub mod grid;
pub mod summary;

pub use grid::{render_month, CellFlags, DayCell, DotColor, DotPalette, MonthGrid};
pub use summary::{CalendarSummaries, DaySummary};

/// The state of the calendar widget: which month is displayed, and which day has been clicked
#[derive(Clone, Debug)]
pub struct CalendarView {
    summaries: CalendarSummaries,
    today: NaiveDate,
    month: NaiveDate,
    selected: Option<NaiveDate>,
}

impl CalendarView {
    pub fn new(summaries: CalendarSummaries, today: NaiveDate) -> Self {
        let month = summaries.initial_month(today);
        Self { summaries, today, month, selected: None }
    }

    pub fn summaries(&self) -> &CalendarSummaries { &self.summaries }
    pub fn selected(&self) -> Option<NaiveDate> { self.selected }

    /// First day of the displayed month
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn next_month(&mut self) -> MonthGrid {
        self.month = grid::next_month(self.month);
        self.render()
    }

    pub fn previous_month(&mut self) -> MonthGrid {
        self.month = grid::previous_month(self.month);
        self.render()
    }

    /// Mark a day as the selected one (there is at most one)
    pub fn select(&mut self, date: NaiveDate) {
        self.selected = Some(date);
    }

    pub fn render(&self) -> MonthGrid {
        render_month(self.month, &self.summaries, self.today, self.selected)
    }
}
