//! Date groups: the collapsible containers that hold every task sharing a deadline

use chrono::NaiveDate;

use crate::task::{Task, TaskId};

/// All the tasks due on a given date, in the order they were rendered (new tasks are appended)
#[derive(Clone, Debug, PartialEq)]
pub struct DateGroup {
    date: NaiveDate,
    /// Header label, e.g. `2026/10/18 (Sun)`
    deadline_display: String,
    /// Header label, e.g. `in 3 days`
    relative_text: String,
    tasks: Vec<Task>,
}

impl DateGroup {
    pub fn new(date: NaiveDate, deadline_display: String, relative_text: String) -> Self {
        Self { date, deadline_display, relative_text, tasks: Vec::new() }
    }

    pub fn date(&self) -> NaiveDate              { self.date }
    pub fn deadline_display(&self) -> &str       { &self.deadline_display }
    pub fn relative_text(&self) -> &str          { &self.relative_text }
    pub fn tasks(&self) -> &[Task]               { &self.tasks }
    pub fn is_empty(&self) -> bool               { self.tasks.is_empty() }

    pub fn date_key(&self) -> String {
        crate::utils::date_key(self.date)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    /// Append a task at the end of this group
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Take a task out of this group
    pub fn detach(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id() == id)?;
        Some(self.tasks.remove(index))
    }
}


/// The date groups of a board, always sorted by date
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupDirectory {
    groups: Vec<DateGroup>,
}

impl GroupDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DateGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.groups.iter().map(|g| g.date()).collect()
    }

    fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.groups.iter().position(|g| g.date() == date)
    }

    pub fn find(&self, date: NaiveDate) -> Option<&DateGroup> {
        self.index_of(date).map(move |i| &self.groups[i])
    }

    pub fn find_mut(&mut self, date: NaiveDate) -> Option<&mut DateGroup> {
        match self.index_of(date) {
            Some(i) => Some(&mut self.groups[i]),
            None => None,
        }
    }

    /// Return the group for `date`, creating it (collapsed and empty) if needed.
    ///
    /// A new group is inserted right before the first group that sorts after it, or appended if none does.
    /// The labels are only used for a new group; an existing group keeps its own.
    /// The returned boolean tells whether the group has been created.
    pub fn find_or_create(&mut self, date: NaiveDate, deadline_display: &str, relative_text: &str) -> (&mut DateGroup, bool) {
        if let Some(i) = self.index_of(date) {
            return (&mut self.groups[i], false);
        }

        let position = self.groups.iter()
            .position(|g| g.date() > date)
            .unwrap_or(self.groups.len());
        log::debug!("Creating date group {} at position {}", date, position);
        self.groups.insert(position, DateGroup::new(date, deadline_display.to_string(), relative_text.to_string()));
        (&mut self.groups[position], true)
    }

    /// Delete the group for `date` if it holds no task anymore. Returns whether it has been deleted
    pub fn remove_if_empty(&mut self, date: NaiveDate) -> bool {
        match self.index_of(date) {
            Some(i) if self.groups[i].is_empty() => {
                log::debug!("Removing empty date group {}", date);
                self.groups.remove(i);
                true
            },
            _ => false,
        }
    }
}
