//! The in-memory model of a seminar task board
//!
//! A [`Board`] holds every task of a seminar, grouped by deadline. It only changes when the server confirmed a
//! change: each mutation is split into a `begin_*` call, that validates the input and registers the request as
//! in flight, and a `finish_*` call, that applies the server reply (or ignores it, if the request has been cancelled
//! meanwhile). Views are derived from the board (see [`crate::view`]), they never hold state of their own.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::HIGHLIGHT_DURATION_MS;
use crate::error::BoardError;
use crate::reply::{TaskReply, ToggleReply};
use crate::task::{Task, TaskId, TaskStatus};
use crate::traits::SeminarId;
use crate::utils;

pub mod date_group;
pub mod in_flight;
pub mod progress;

use date_group::{DateGroup, GroupDirectory};
use in_flight::{InFlight, Request, Slot};
use progress::{GlobalProgress, GroupProgress};

/// A completion change waiting for its reply
#[derive(Debug)]
pub struct ToggleTicket {
    task: TaskId,
    completed: bool,
    generation: u64,
}

impl ToggleTicket {
    pub fn task(&self) -> TaskId { self.task }
    pub fn completed(&self) -> bool { self.completed }
}

/// An inline edit waiting for its reply
#[derive(Debug)]
pub struct EditTicket {
    task: TaskId,
    name: String,
    deadline: String,
    generation: u64,
}

impl EditTicket {
    pub fn task(&self) -> TaskId { self.task }
    /// The trimmed name to send
    pub fn name(&self) -> &str { &self.name }
    /// The trimmed deadline to send
    pub fn deadline(&self) -> &str { &self.deadline }
}

/// A task creation waiting for its reply
#[derive(Debug)]
pub struct CreateTicket {
    name: String,
    deadline: String,
    generation: u64,
}

impl CreateTicket {
    pub fn name(&self) -> &str { &self.name }
    pub fn deadline(&self) -> &str { &self.deadline }
}

/// What an applied edit changed in the group layout
#[derive(Clone, Debug, PartialEq)]
pub struct EditOutcome {
    pub task: TaskId,
    pub status: TaskStatus,
    /// The group the task now belongs to
    pub group: NaiveDate,
    /// Set when the task changed group
    pub moved_from: Option<NaiveDate>,
    pub created_group: bool,
    /// Set when the previous group became empty and has been removed
    pub removed_group: Option<NaiveDate>,
}

/// What an applied creation changed in the group layout
#[derive(Clone, Debug, PartialEq)]
pub struct CreateOutcome {
    pub task: TaskId,
    pub group: NaiveDate,
    pub created_group: bool,
    /// Whether the group has been expanded because of this creation (it was collapsed before)
    pub opened_group: bool,
}

pub struct Board {
    seminar: SeminarId,
    today: NaiveDate,
    directory: GroupDirectory,
    /// Which group each task belongs to
    owners: HashMap<TaskId, NaiveDate>,
    expanded: BTreeSet<NaiveDate>,
    highlight: Option<(NaiveDate, DateTime<Utc>)>,
    in_flight: InFlight,
}

impl Board {
    /// Build a board from the tasks of a seminar.
    ///
    /// Tasks are grouped by deadline and keep their relative order inside a group. Every group starts collapsed.
    pub fn new(seminar: SeminarId, tasks: Vec<Task>, today: NaiveDate) -> Self {
        let mut board = Self {
            seminar,
            today,
            directory: GroupDirectory::new(),
            owners: HashMap::new(),
            expanded: BTreeSet::new(),
            highlight: None,
            in_flight: InFlight::new(),
        };

        for task in tasks {
            if board.owners.contains_key(&task.id()) {
                log::warn!("Task {} is listed twice, ignoring the second one", task.id());
                continue;
            }
            let date = task.deadline();
            let display = utils::format_date_with_weekday(date);
            let relative = utils::describe_relative_days(date, today);
            let id = task.id();
            let (group, _) = board.directory.find_or_create(date, &display, &relative);
            group.push(task);
            board.owners.insert(id, date);
        }
        board
    }

    pub fn seminar(&self) -> SeminarId { self.seminar }
    pub fn today(&self) -> NaiveDate { self.today }

    pub fn groups(&self) -> std::slice::Iter<'_, DateGroup> {
        self.directory.iter()
    }

    pub fn group(&self, date: NaiveDate) -> Option<&DateGroup> {
        self.directory.find(date)
    }

    /// The date of the group a task belongs to
    pub fn group_of(&self, id: TaskId) -> Option<NaiveDate> {
        self.owners.get(&id).copied()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        let date = self.group_of(id)?;
        self.directory.find(date)?.task(id)
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        let date = self.group_of(id)?;
        self.directory.find_mut(date)?.task_mut(id)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn group_progress(&self, date: NaiveDate) -> Option<GroupProgress> {
        self.directory.find(date).map(|g| GroupProgress::of(g.tasks()))
    }

    pub fn progress(&self) -> GlobalProgress {
        let per_group: Vec<GroupProgress> = self.groups().map(|g| GroupProgress::of(g.tasks())).collect();
        GlobalProgress::from_groups(&per_group)
    }

    /// Whether a request about this task is pending
    pub fn is_in_flight(&self, id: TaskId) -> bool {
        self.in_flight.is_pending(Slot::Task(id))
    }

    pub fn is_creating(&self) -> bool {
        self.in_flight.is_pending(Slot::NewTask)
    }

    /// The completion state a pending toggle asked for, if any
    pub fn requested_completion(&self, id: TaskId) -> Option<bool> {
        match self.in_flight.request(Slot::Task(id)) {
            Some(Request::Toggle { completed }) => Some(completed),
            _ => None,
        }
    }


    //
    // Completion toggle
    //

    pub fn begin_toggle(&mut self, id: TaskId, completed: bool) -> Result<ToggleTicket, BoardError> {
        if self.task(id).is_none() {
            return Err(BoardError::UnknownTask(id));
        }
        let generation = self.in_flight.begin(Slot::Task(id), Request::Toggle { completed })?;
        Ok(ToggleTicket { task: id, completed, generation })
    }

    /// Apply the outcome of a toggle request.
    ///
    /// The in-flight slot is released whatever the outcome. On failure the task is left untouched, which reverts
    /// the requested completion state.
    pub fn finish_toggle(&mut self, ticket: ToggleTicket, result: Result<ToggleReply, BoardError>) -> Result<TaskStatus, BoardError> {
        let slot = Slot::Task(ticket.task);
        if self.in_flight.finish(slot, ticket.generation) == false {
            log::info!("Ignoring a stale toggle response for {}", slot);
            return Err(BoardError::Stale(slot.to_string()));
        }
        let reply = result?;

        let task = self.task_mut(ticket.task).ok_or(BoardError::UnknownTask(ticket.task))?;
        let completed = match reply.is_done {
            Some(done) => {
                if done != ticket.completed {
                    log::warn!("Asked the server to set task {} to completed={}, it says completed={}", ticket.task, ticket.completed, done);
                }
                done
            },
            None => ticket.completed,
        };
        task.set_completed(completed);
        task.set_overdue(reply.is_overdue);
        Ok(task.status())
    }


    //
    // Inline edit
    //

    pub fn begin_edit(&mut self, id: TaskId, name: &str, deadline: &str) -> Result<EditTicket, BoardError> {
        let (name, deadline) = validate_task_input(name, deadline)?;
        if self.task(id).is_none() {
            return Err(BoardError::UnknownTask(id));
        }
        let generation = self.in_flight.begin(Slot::Task(id), Request::Edit)?;
        Ok(EditTicket { task: id, name, deadline, generation })
    }

    /// Apply the outcome of an edit request.
    ///
    /// If the deadline moved to another date, the task is moved to the matching group (created if needed),
    /// and its former group is removed if it is now empty. The completion state is kept.
    pub fn finish_edit(&mut self, ticket: EditTicket, result: Result<TaskReply, BoardError>) -> Result<EditOutcome, BoardError> {
        let slot = Slot::Task(ticket.task);
        if self.in_flight.finish(slot, ticket.generation) == false {
            log::info!("Ignoring a stale edit response for {}", slot);
            return Err(BoardError::Stale(slot.to_string()));
        }
        let reply = result?;
        let new_date = reply.deadline()?;
        let old_date = self.group_of(ticket.task).ok_or(BoardError::UnknownTask(ticket.task))?;

        let mut outcome = EditOutcome {
            task: ticket.task,
            status: TaskStatus::Pending,
            group: new_date,
            moved_from: None,
            created_group: false,
            removed_group: None,
        };

        if new_date != old_date {
            let task = self.directory.find_mut(old_date)
                .and_then(|g| g.detach(ticket.task))
                .ok_or(BoardError::UnknownTask(ticket.task))?;
            let (group, created) = self.directory.find_or_create(new_date, &reply.deadline_display, &reply.relative_text);
            group.push(task);
            self.owners.insert(ticket.task, new_date);

            outcome.moved_from = Some(old_date);
            outcome.created_group = created;
            if self.directory.remove_if_empty(old_date) {
                self.expanded.remove(&old_date);
                outcome.removed_group = Some(old_date);
            }
            log::debug!("Task {} moved from {} to {}", ticket.task, old_date, new_date);
        }

        let task = self.task_mut(ticket.task).ok_or(BoardError::UnknownTask(ticket.task))?;
        task.set_name(reply.name.clone());
        task.set_deadline(new_date);
        task.set_overdue(reply.is_overdue);
        outcome.status = task.status();
        Ok(outcome)
    }


    //
    // Creation
    //

    pub fn begin_create(&mut self, name: &str, deadline: &str) -> Result<CreateTicket, BoardError> {
        let (name, deadline) = validate_task_input(name, deadline)?;
        let generation = self.in_flight.begin(Slot::NewTask, Request::Create)?;
        Ok(CreateTicket { name, deadline, generation })
    }

    /// Apply the outcome of a creation request: append the new task to its group, and expand that group
    pub fn finish_create(&mut self, ticket: CreateTicket, result: Result<TaskReply, BoardError>) -> Result<CreateOutcome, BoardError> {
        if self.in_flight.finish(Slot::NewTask, ticket.generation) == false {
            log::info!("Ignoring a stale creation response");
            return Err(BoardError::Stale(Slot::NewTask.to_string()));
        }
        let reply = result?;
        let task = reply.to_task()?;
        let id = task.id();
        if self.owners.contains_key(&id) {
            return Err(BoardError::Transport(format!("the server created task {} that is already on this board", id)));
        }

        let date = task.deadline();
        let (group, created_group) = self.directory.find_or_create(date, &reply.deadline_display, &reply.relative_text);
        group.push(task);
        self.owners.insert(id, date);
        let opened_group = self.open_group(date);

        Ok(CreateOutcome { task: id, group: date, created_group, opened_group })
    }


    /// Forget the pending request about a task. Its response will be ignored when it arrives
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.in_flight.cancel(Slot::Task(id))
    }

    pub fn cancel_create(&mut self) -> bool {
        self.in_flight.cancel(Slot::NewTask)
    }


    //
    // Accordion
    //

    pub fn is_expanded(&self, date: NaiveDate) -> bool {
        self.expanded.contains(&date)
    }

    pub fn expanded_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.expanded
    }

    /// Expand a collapsed group, or collapse an expanded one.
    ///
    /// Returns the new state, or `None` if there is no such group.
    pub fn toggle_group(&mut self, date: NaiveDate) -> Option<bool> {
        self.directory.find(date)?;
        if self.expanded.remove(&date) {
            Some(false)
        } else {
            self.expanded.insert(date);
            Some(true)
        }
    }

    /// Expand a group. Returns `true` if it was collapsed before
    pub fn open_group(&mut self, date: NaiveDate) -> bool {
        if self.directory.find(date).is_none() {
            return false;
        }
        self.expanded.insert(date)
    }

    /// Draw the attention to a group for a short while. Returns `false` if there is no such group
    pub fn highlight_group(&mut self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        if self.directory.find(date).is_none() {
            return false;
        }
        self.highlight = Some((date, now + Duration::milliseconds(HIGHLIGHT_DURATION_MS)));
        true
    }

    pub fn highlighted_group(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        match self.highlight {
            Some((date, until)) if now < until && self.directory.find(date).is_some() => Some(date),
            _ => None,
        }
    }
}

/// Client-side checks, done before any request is sent. Returns the trimmed name and deadline
pub fn validate_task_input(name: &str, deadline: &str) -> Result<(String, String), BoardError> {
    let name = name.trim();
    let deadline = deadline.trim();
    if name.is_empty() {
        return Err(BoardError::Validation { field: "name", message: "Please enter a task name".to_string() });
    }
    if utils::looks_like_date_input(deadline) == false {
        return Err(BoardError::Validation { field: "deadline", message: "Please enter a valid date (YYYY-MM-DD)".to_string() });
    }
    Ok((name.to_string(), deadline.to_string()))
}
