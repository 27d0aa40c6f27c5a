//! The controller of a seminar page
//!
//! It owns the board, the calendar, the persisted UI state and the service, and turns user actions into
//! service requests. Locks are never held while a request is pending, so that requests about different tasks
//! can be in flight at the same time.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};

use crate::board::{Board, CreateOutcome, EditOutcome};
use crate::calendar::{CalendarSummaries, CalendarView, MonthGrid};
use crate::error::BoardError;
use crate::reply::settle;
use crate::state::UiState;
use crate::task::{Task, TaskId, TaskStatus};
use crate::traits::{SeminarId, TaskService};
use crate::view::PageView;

pub struct SeminarController<S> {
    service: S,
    board: Mutex<Board>,
    calendar: Mutex<CalendarView>,
    state: Mutex<UiState>,
}

impl<S> SeminarController<S>
where
    S: TaskService + Sync,
{
    pub fn new(service: S, board: Board, calendar: CalendarView, state: UiState) -> Self {
        Self {
            service,
            board: Mutex::new(board),
            calendar: Mutex::new(calendar),
            state: Mutex::new(state),
        }
    }

    /// Build the controller of a freshly loaded page, from what the server rendered into it
    pub fn from_page(service: S, seminar: SeminarId, tasks: Vec<Task>, calendar_json: Option<&str>, state: UiState, today: NaiveDate) -> Self {
        let board = Board::new(seminar, tasks, today);
        let calendar = CalendarView::new(CalendarSummaries::from_embedded_json(calendar_json), today);
        log::info!("Seminar {}: {} tasks in {} date groups", seminar, board.len(), board.groups().len());
        Self::new(service, board, calendar, state)
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run a closure on the current board
    pub fn with_board<R, F: FnOnce(&Board) -> R>(&self, f: F) -> R {
        f(&self.board())
    }

    pub fn with_state<R, F: FnOnce(&UiState) -> R>(&self, f: F) -> R {
        f(&self.state())
    }


    /// Ask the server to mark a task as completed (or not), then update the board with its answer.
    ///
    /// While the request is pending, the task shows the requested state and its controls are disabled.
    pub async fn toggle_completion(&self, id: TaskId, completed: bool) -> Result<TaskStatus, BoardError> {
        let ticket = self.board().begin_toggle(id, completed)?;
        log::debug!("Toggling task {} to completed={}", id, completed);
        let result = settle(self.service.toggle_task(id, completed).await);
        self.board().finish_toggle(ticket, result)
    }

    /// Rename a task and/or move its deadline. The task changes group if its date changed
    pub async fn edit_task(&self, id: TaskId, name: &str, deadline: &str) -> Result<EditOutcome, BoardError> {
        let ticket = self.board().begin_edit(id, name, deadline)?;
        log::debug!("Updating task {}", id);
        let result = settle(self.service.update_task(id, ticket.name(), ticket.deadline()).await);
        let outcome = self.board().finish_edit(ticket, result)?;
        if let Some(removed) = outcome.removed_group {
            self.persist_open(removed, false);
        }
        Ok(outcome)
    }

    /// Create a task. Its group is expanded so that it is visible
    pub async fn create_task(&self, name: &str, deadline: &str) -> Result<CreateOutcome, BoardError> {
        let (ticket, seminar) = {
            let mut board = self.board();
            (board.begin_create(name, deadline)?, board.seminar())
        };
        log::debug!("Creating task {:?} in seminar {}", ticket.name(), seminar);
        let result = settle(self.service.create_task(seminar, ticket.name(), ticket.deadline()).await);
        let outcome = self.board().finish_create(ticket, result)?;
        self.persist_open(outcome.group, true);
        Ok(outcome)
    }

    /// Forget the pending request about a task: its answer will be ignored
    pub fn cancel(&self, id: TaskId) -> bool {
        self.board().cancel(id)
    }


    /// Expand or collapse a date group. Returns the new state, or `None` if there is no such group
    pub fn toggle_group(&self, date: NaiveDate) -> Option<bool> {
        let expanded = self.board().toggle_group(date)?;
        self.persist_open(date, expanded);
        Some(expanded)
    }

    pub fn next_month(&self) -> MonthGrid {
        self.calendar().next_month()
    }

    pub fn prev_month(&self) -> MonthGrid {
        self.calendar().previous_month()
    }

    /// A calendar cell was clicked: select it, and highlight the matching date group if there is one
    pub fn select_date(&self, date: NaiveDate, now: DateTime<Utc>) -> MonthGrid {
        let grid = {
            let mut calendar = self.calendar();
            calendar.select(date);
            calendar.render()
        };
        if self.board().highlight_group(date, now) == false {
            log::debug!("No date group for {}", date);
        }
        grid
    }

    pub fn calendar_grid(&self) -> MonthGrid {
        self.calendar().render()
    }

    pub fn page_view(&self) -> PageView {
        PageView::project(&self.board())
    }

    pub fn page_view_at(&self, now: DateTime<Utc>) -> PageView {
        PageView::project_at(&self.board(), now)
    }


    fn persist_open(&self, date: NaiveDate, open: bool) {
        let mut state = self.state();
        if state.set_open(date, open) {
            state.save_to_file();
        }
    }

    fn board(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn calendar(&self) -> MutexGuard<'_, CalendarView> {
        self.calendar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> MutexGuard<'_, UiState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalTaskService;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn expanded_groups_are_persisted() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let today = date(2026, 10, 18);
        let service = LocalTaskService::new(today);
        service.add_task(1, "Print badges", date(2026, 10, 22), false).unwrap();
        let tasks = service.tasks(1).unwrap();
        let controller = SeminarController::from_page(service, 1, tasks, None, UiState::new(&path), today);

        assert_eq!(controller.toggle_group(date(2026, 10, 22)), Some(true));
        assert!(UiState::from_file(&path).unwrap().open_dates().contains("2026-10-22"));
        assert_eq!(controller.toggle_group(date(2026, 10, 22)), Some(false));
        assert!(UiState::from_file(&path).unwrap().open_dates().is_empty());
        assert_eq!(controller.toggle_group(date(2026, 10, 23)), None);
    }

    #[tokio::test]
    async fn selecting_a_date_highlights_its_group() {
        let dir = tempfile::tempdir().unwrap();
        let today = date(2026, 10, 18);
        let service = LocalTaskService::new(today);
        service.add_task(1, "Print badges", date(2026, 10, 22), false).unwrap();
        let tasks = service.tasks(1).unwrap();
        let controller = SeminarController::from_page(service, 1, tasks, None, UiState::new(&dir.path().join("s.json")), today);

        let now = Utc::now();
        let grid = controller.select_date(date(2026, 10, 22), now);
        assert!(grid.cell(date(2026, 10, 22)).unwrap().is_selected());
        assert!(controller.page_view_at(now).group("2026-10-22").unwrap().highlighted);
        let later = now + chrono::Duration::milliseconds(1500);
        assert!(controller.page_view_at(later).group("2026-10-22").unwrap().highlighted == false);
    }
}
