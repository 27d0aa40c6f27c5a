//! Per-date task summaries, embedded in the page as JSON when it is served
//!
//! This is a snapshot: it is read once and is not kept in sync with later task changes.

use std::collections::BTreeMap;
use std::error::Error;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId};

/// A task, as listed in the embedded calendar payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryTask {
    pub id: u64,
    pub name: String,
    #[serde(rename = "isDone", default)]
    pub is_done: bool,
    #[serde(rename = "isOverdue", default)]
    pub is_overdue: bool,
    pub deadline: NaiveDate,
}

/// How many tasks are due on a date, and how they are doing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total: u32,
    pub completed: u32,
    pub overdue: u32,
    #[serde(default)]
    pub tasks: Vec<SummaryTask>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalendarSummaries {
    by_date: BTreeMap<NaiveDate, DaySummary>,
}

impl CalendarSummaries {
    pub fn new(summaries: Vec<DaySummary>) -> Self {
        Self {
            by_date: summaries.into_iter().map(|s| (s.date, s)).collect(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, Box<dyn Error>> {
        let summaries: Vec<DaySummary> = serde_json::from_str(text)?;
        Ok(Self::new(summaries))
    }

    /// Read the payload embedded in a page.
    ///
    /// A missing or malformed payload is not an error: it leaves the calendar empty.
    pub fn from_embedded_json(text: Option<&str>) -> Self {
        let text = match text {
            Some(t) if t.trim().is_empty() == false => t,
            _ => return Self::default(),
        };
        match Self::parse(text) {
            Ok(summaries) => summaries,
            Err(err) => {
                log::warn!("Failed to parse calendar data: {}", err);
                Self::default()
            },
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DaySummary> {
        self.by_date.get(&date)
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// The first day of the month the calendar should open on: the month of the first date that is not past yet,
    /// or of the earliest date if they all are, or the current month if there is no data.
    pub fn initial_month(&self, today: NaiveDate) -> NaiveDate {
        let focus = self.by_date.keys()
            .find(|d| **d >= today)
            .or_else(|| self.by_date.keys().next())
            .copied()
            .unwrap_or(today);
        super::grid::first_of_month(focus)
    }

    /// The tasks listed in the payload, by date then in payload order
    pub fn tasks(&self) -> Vec<Task> {
        self.by_date.values()
            .flat_map(|summary| summary.tasks.iter())
            .map(|t| Task::new(TaskId::from(t.id), t.name.clone(), t.deadline, t.is_done, t.is_overdue))
            .collect()
    }
}
