//! Utilities to compare custom types
//!
//! These can be used to sort results, e.g. with `sort_by`

use crate::task::Task;
use crate::templates::TaskTemplate;

/// The order the server renders tasks in: by deadline, then by id
pub fn compare_tasks_by_deadline(left: &Task, right: &Task) -> std::cmp::Ordering {
    left.deadline().cmp(&right.deadline())
        .then_with(|| left.id().cmp(&right.id()))
}

/// Compare alphabetically task templates
pub fn compare_templates_alpha(left: &TaskTemplate, right: &TaskTemplate) -> std::cmp::Ordering {
    Ord::cmp(&left.name().to_lowercase(), &right.name().to_lowercase())
}
