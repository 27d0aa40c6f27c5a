//! Read-only projections of a [`Board`], ready to be displayed
//!
//! Nothing in here holds state: a view is rebuilt from the board after every change.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::board::Board;
use crate::board::date_group::DateGroup;
use crate::board::progress::GroupProgress;
use crate::task::{Task, TaskId};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowView {
    pub task_id: TaskId,
    pub name: String,
    /// One of `task-completed`, `task-pending`, `task-overdue`
    pub css_class: &'static str,
    pub line_through: bool,
    /// The checkbox state: the requested state while a toggle is in flight, the confirmed one otherwise
    pub checked: bool,
    /// Controls are disabled while a request about this task is in flight
    pub disabled: bool,
    pub date_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupView {
    pub date_key: String,
    pub deadline_display: String,
    pub relative_text: String,
    pub expanded: bool,
    pub highlighted: bool,
    pub completed_label: String,
    /// Hidden (`None`) when nothing is overdue
    pub overdue_label: Option<String>,
    pub rows: Vec<RowView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageView {
    pub groups: Vec<GroupView>,
    /// e.g. `3/8 (38%)`
    pub progress_label: String,
    pub progress_percent: u32,
    /// CSS width of the progress bar, e.g. `38%`
    pub progress_bar_width: String,
    /// Whether the "add task" button is disabled
    pub creating: bool,
}

impl RowView {
    pub fn project(board: &Board, task: &Task) -> Self {
        let status = task.status();
        Self {
            task_id: task.id(),
            name: task.name().to_string(),
            css_class: status.css_class(),
            line_through: task.completed(),
            checked: board.requested_completion(task.id()).unwrap_or_else(|| task.completed()),
            disabled: board.is_in_flight(task.id()),
            date_key: task.date_key(),
        }
    }
}

impl GroupView {
    pub fn project(board: &Board, group: &DateGroup, now: DateTime<Utc>) -> Self {
        let progress = GroupProgress::of(group.tasks());
        Self {
            date_key: group.date_key(),
            deadline_display: group.deadline_display().to_string(),
            relative_text: group.relative_text().to_string(),
            expanded: board.is_expanded(group.date()),
            highlighted: board.highlighted_group(now) == Some(group.date()),
            completed_label: progress.completed_label(),
            overdue_label: progress.overdue_label(),
            rows: group.tasks().iter().map(|t| RowView::project(board, t)).collect(),
        }
    }
}

impl PageView {
    pub fn project(board: &Board) -> Self {
        Self::project_at(board, Utc::now())
    }

    pub fn project_at(board: &Board, now: DateTime<Utc>) -> Self {
        let progress = board.progress();
        Self {
            groups: board.groups().map(|g| GroupView::project(board, g, now)).collect(),
            progress_label: progress.label(),
            progress_percent: progress.percent(),
            progress_bar_width: progress.bar_width(),
            creating: board.is_creating(),
        }
    }

    pub fn group(&self, date_key: &str) -> Option<&GroupView> {
        self.groups.iter().find(|g| g.date_key == date_key)
    }

    pub fn row(&self, id: TaskId) -> Option<&RowView> {
        self.groups.iter().flat_map(|g| g.rows.iter()).find(|r| r.task_id == id)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::reply::ToggleReply;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn board() -> Board {
        Board::new(1, vec![
            Task::new(TaskId::from(1), "Reserve the room".to_string(), date(2026, 10, 10), false, true),
            Task::new(TaskId::from(2), "Send the agenda".to_string(), date(2026, 10, 10), true, false),
            Task::new(TaskId::from(3), "Print badges".to_string(), date(2026, 10, 30), false, false),
        ], date(2026, 10, 18))
    }

    #[test]
    fn projects_labels_and_classes() {
        let page = PageView::project(&board());
        assert_eq!(page.progress_label, "1/3 (33%)");
        assert_eq!(page.progress_bar_width, "33%");

        let past = page.group("2026-10-10").unwrap();
        assert_eq!(past.completed_label, "completed 1/2");
        assert_eq!(past.overdue_label, Some("overdue 1".to_string()));
        assert_eq!(past.relative_text, "8 days ago");
        assert!(past.expanded == false);

        let future = page.group("2026-10-30").unwrap();
        assert_eq!(future.overdue_label, None);

        assert_eq!(page.row(TaskId::from(1)).unwrap().css_class, "task-overdue");
        let done = page.row(TaskId::from(2)).unwrap();
        assert_eq!(done.css_class, "task-completed");
        assert!(done.line_through);
        assert_eq!(page.row(TaskId::from(3)).unwrap().css_class, "task-pending");
    }

    #[test]
    fn in_flight_toggles_show_the_requested_state() {
        let mut board = board();
        let ticket = board.begin_toggle(TaskId::from(3), true).unwrap();
        let row = PageView::project(&board).row(TaskId::from(3)).cloned().unwrap();
        assert!(row.checked);
        assert!(row.disabled);
        assert_eq!(row.css_class, "task-pending");

        // The server fails: the checkbox goes back, the control is enabled again
        let _ = board.finish_toggle(ticket, Err(crate::error::BoardError::Transport("reset".to_string())));
        let row = PageView::project(&board).row(TaskId::from(3)).cloned().unwrap();
        assert!(row.checked == false);
        assert!(row.disabled == false);

        let ticket = board.begin_toggle(TaskId::from(3), true).unwrap();
        board.finish_toggle(ticket, Ok(ToggleReply { is_overdue: false, is_done: None })).unwrap();
        let row = PageView::project(&board).row(TaskId::from(3)).cloned().unwrap();
        assert_eq!(row.css_class, "task-completed");
        assert!(row.checked);
    }
}
