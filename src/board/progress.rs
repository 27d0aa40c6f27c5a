//! Completion counts, per date group and for the whole board

use crate::task::Task;

/// Counts of a single date group
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupProgress {
    pub completed: usize,
    pub total: usize,
    /// Tasks that are not completed and flagged overdue
    pub overdue: usize,
}

impl GroupProgress {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed()).count();
        let overdue = tasks.iter().filter(|t| !t.completed() && t.overdue()).count();
        Self { completed, total: tasks.len(), overdue }
    }

    pub fn completed_label(&self) -> String {
        format!("completed {}/{}", self.completed, self.total)
    }

    /// Only there when something is overdue
    pub fn overdue_label(&self) -> Option<String> {
        if self.overdue > 0 {
            Some(format!("overdue {}", self.overdue))
        } else {
            None
        }
    }
}

/// Counts of every task on the board
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlobalProgress {
    pub done: usize,
    pub total: usize,
}

impl GlobalProgress {
    pub fn from_groups<'a, I: IntoIterator<Item = &'a GroupProgress>>(groups: I) -> Self {
        groups.into_iter().fold(Self::default(), |acc, g| Self {
            done: acc.done + g.completed,
            total: acc.total + g.total,
        })
    }

    /// Rounded percentage of done tasks, 0 for an empty board
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.done as f64) * 100.0 / (self.total as f64)).round() as u32
    }

    /// e.g. `3/8 (38%)`, or `0/0` for an empty board
    pub fn label(&self) -> String {
        if self.total > 0 {
            format!("{}/{} ({}%)", self.done, self.total, self.percent())
        } else {
            format!("{}/{}", self.done, self.total)
        }
    }

    /// The CSS width of the progress bar
    pub fn bar_width(&self) -> String {
        format!("{}%", self.percent())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::task::TaskId;

    fn task(id: u64, completed: bool, overdue: bool) -> Task {
        Task::new(TaskId::from(id), String::new(), NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(), completed, overdue)
    }

    #[test]
    fn group_counts() {
        let tasks = vec![task(1, true, false), task(2, false, true), task(3, false, false), task(4, true, true)];
        let progress = GroupProgress::of(&tasks);
        assert_eq!(progress, GroupProgress { completed: 2, total: 4, overdue: 1 });
        assert_eq!(progress.completed_label(), "completed 2/4");
        assert_eq!(progress.overdue_label(), Some("overdue 1".to_string()));

        assert_eq!(GroupProgress::of(&[task(1, false, false)]).overdue_label(), None);
    }

    #[test]
    fn global_labels() {
        let empty = GlobalProgress::default();
        assert_eq!(empty.label(), "0/0");
        assert_eq!(empty.bar_width(), "0%");

        let groups = vec![
            GroupProgress { completed: 1, total: 3, overdue: 0 },
            GroupProgress { completed: 1, total: 5, overdue: 2 },
        ];
        let global = GlobalProgress::from_groups(&groups);
        assert_eq!(global, GlobalProgress { done: 2, total: 8 });
        assert_eq!(global.percent(), 25);
        assert_eq!(global.label(), "2/8 (25%)");

        // Rounding
        assert_eq!(GlobalProgress { done: 1, total: 3 }.percent(), 33);
        assert_eq!(GlobalProgress { done: 2, total: 3 }.percent(), 67);
        assert_eq!(GlobalProgress { done: 1, total: 8 }.label(), "1/8 (13%)");
    }
}
