//! Drive a seminar page controller the way a user would

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use seminar_board::calendar::DotColor;
use seminar_board::mock_behaviour::MockBehaviour;
use seminar_board::state::UiState;
use seminar_board::{BoardError, TaskStatus};

use scenarii::*;


#[tokio::test]
async fn test_toggle_completion() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let service = populate_service(&reference_seminar(), None);
    let badges = task_named(&service, "Print badges");
    let tasks = service.tasks(SEMINAR).unwrap();
    let controller = load_page(service, tasks, dir.path());

    let before = controller.page_view();
    assert_eq!(before.progress_label, "1/5 (20%)");
    assert_eq!(before.group("2026-10-22").unwrap().completed_label, "completed 0/1");

    let status = controller.toggle_completion(badges, true).await.unwrap();
    assert_eq!(status, TaskStatus::Completed);

    let after = controller.page_view();
    let row = after.row(badges).unwrap();
    assert_eq!(row.css_class, "task-completed");
    assert!(row.checked);
    assert!(row.disabled == false);
    assert_eq!(after.group("2026-10-22").unwrap().completed_label, "completed 1/1");
    assert_eq!(after.progress_label, "2/5 (40%)");
    assert_eq!(after.progress_bar_width, "40%");

    // Un-completing an overdue task brings its overdue class back, as the server says
    let room = task_named(controller.service(), "Reserve the room");
    controller.toggle_completion(room, true).await.unwrap();
    assert_eq!(controller.toggle_completion(room, false).await.unwrap(), TaskStatus::Overdue);
    assert_eq!(controller.page_view().group("2026-10-10").unwrap().overdue_label, Some("overdue 1".to_string()));
}

#[tokio::test]
async fn test_failed_toggle_reverts() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let behaviour = Arc::new(Mutex::new(MockBehaviour::new()));
    let service = populate_service(&reference_seminar(), Some(behaviour.clone()));
    let coffee = task_named(&service, "Order coffee");
    let tasks = service.tasks(SEMINAR).unwrap();
    let controller = load_page(service, tasks, dir.path());

    behaviour.lock().unwrap().toggle_task_behaviour = (0, 1);
    let err = controller.toggle_completion(coffee, true).await.unwrap_err();
    assert!(matches!(err, BoardError::Transport(_)));
    assert_eq!(err.user_message(), seminar_board::error::COMMUNICATION_ERROR);

    let row = controller.page_view().row(coffee).cloned().unwrap();
    assert!(row.checked == false);
    assert!(row.disabled == false);
    assert_eq!(row.css_class, "task-pending");

    // The control is usable again
    assert_eq!(controller.toggle_completion(coffee, true).await.unwrap(), TaskStatus::Completed);
}

#[tokio::test]
async fn test_edit_moves_tasks_between_groups() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let service = populate_service(&reference_seminar(), None);
    let badges = task_named(&service, "Print badges");
    let coffee = task_named(&service, "Order coffee");
    let tasks = service.tasks(SEMINAR).unwrap();
    let controller = load_page(service, tasks, dir.path());
    controller.toggle_group(date(2026, 10, 22));
    controller.toggle_completion(badges, true).await.unwrap();

    // The only task of 2026-10-22 moves to a date that has no group yet
    let outcome = controller.edit_task(badges, " Print name badges ", "2026-10-26").await.unwrap();
    assert_eq!(outcome.moved_from, Some(date(2026, 10, 22)));
    assert_eq!(outcome.removed_group, Some(date(2026, 10, 22)));
    assert!(outcome.created_group);

    let page = controller.page_view();
    let keys: Vec<&str> = page.groups.iter().map(|g| g.date_key.as_str()).collect();
    assert_eq!(keys, vec!["2026-10-10", "2026-10-26", "2026-10-30"]);
    let moved = page.group("2026-10-26").unwrap();
    assert_eq!(moved.rows.len(), 1);
    assert_eq!(moved.rows[0].name, "Print name badges");
    assert_eq!(moved.deadline_display, "2026/10/26 (Mon)");
    assert_eq!(moved.relative_text, "in 8 days");
    // Completion survives the move
    assert_eq!(moved.rows[0].css_class, "task-completed");
    assert_eq!(page.progress_label, "2/5 (40%)");

    // The removed group is no longer remembered as expanded
    let state = UiState::from_file(&UiState::default_path(dir.path(), "Autumn seminar")).unwrap();
    assert!(state.open_dates().contains("2026-10-22") == false);

    // Moving one of two tasks keeps the old group
    let outcome = controller.edit_task(coffee, "Order coffee", "2026-10-26").await.unwrap();
    assert_eq!(outcome.removed_group, None);
    assert!(outcome.created_group == false);
    let page = controller.page_view();
    assert_eq!(page.group("2026-10-30").unwrap().rows.len(), 1);
    let names: Vec<&str> = page.group("2026-10-26").unwrap().rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Print name badges", "Order coffee"]);
}

#[tokio::test]
async fn test_invalid_edits_send_nothing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let behaviour = Arc::new(Mutex::new(MockBehaviour::new()));
    let service = populate_service(&reference_seminar(), Some(behaviour.clone()));
    let badges = task_named(&service, "Print badges");
    let tasks = service.tasks(SEMINAR).unwrap();
    let controller = load_page(service, tasks, dir.path());

    // Any request would fail at transport level
    behaviour.lock().unwrap().update_task_behaviour = (0, 10);

    let err = controller.edit_task(badges, "   ", "2026-10-26").await.unwrap_err();
    assert_eq!(err.user_message(), "Please enter a task name");
    let err = controller.edit_task(badges, "Badges", "26/10/2026").await.unwrap_err();
    assert_eq!(err.user_message(), "Please enter a valid date (YYYY-MM-DD)");
    assert_eq!(behaviour.lock().unwrap().update_task_behaviour, (0, 10));
    assert!(controller.page_view().row(badges).unwrap().disabled == false);

    // A well-shaped date that does not exist is up to the server
    behaviour.lock().unwrap().update_task_behaviour = (0, 0);
    let err = controller.edit_task(badges, "Badges", "2026-02-30").await.unwrap_err();
    assert_eq!(err.user_message(), "Please enter a valid date (YYYY-MM-DD)");
    assert_eq!(controller.page_view().row(badges).unwrap().name, "Print badges");
}

#[tokio::test]
async fn test_create_task() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let service = populate_service(&reference_seminar(), None);
    let tasks = service.tasks(SEMINAR).unwrap();
    let controller = load_page(service, tasks, dir.path());

    let outcome = controller.create_task("Print the attendee list", "2026-10-20").await.unwrap();
    assert!(outcome.created_group);
    assert!(outcome.opened_group);

    let page = controller.page_view();
    let group = page.group("2026-10-20").unwrap();
    assert!(group.expanded);
    assert_eq!(group.rows.len(), 1);
    assert_eq!(page.groups[1].date_key, "2026-10-20");
    assert_eq!(page.progress_label, "1/6 (17%)");

    let state = UiState::from_file(&UiState::default_path(dir.path(), "Autumn seminar")).unwrap();
    assert!(state.open_dates().contains("2026-10-20"));
}

#[tokio::test]
async fn test_rejected_create_appends_nothing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let tasks = populate_service(&reference_seminar(), None).tasks(SEMINAR).unwrap();
    let mut errors = BTreeMap::new();
    errors.insert("name".to_string(), "required".to_string());
    let controller = load_page(RejectingService { errors }, tasks, dir.path());

    let err = controller.create_task("Something", "2026-10-20").await.unwrap_err();
    assert_eq!(err.user_message(), "required");

    let page = controller.page_view();
    assert!(page.group("2026-10-20").is_none());
    assert_eq!(page.groups.iter().map(|g| g.rows.len()).sum::<usize>(), 5);
    assert!(page.creating == false);
}

#[tokio::test]
async fn test_concurrent_requests() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let inner = populate_service(&reference_seminar(), None);
    let badges = task_named(&inner, "Print badges");
    let coffee = task_named(&inner, "Order coffee");
    let tasks = inner.tasks(SEMINAR).unwrap();
    let controller = load_page(SlowService { inner, yields: 3 }, tasks, dir.path());

    // Requests about different tasks run side by side; a second one about the same task is refused
    let (a, b, c) = tokio::join!(
        controller.toggle_completion(badges, true),
        controller.toggle_completion(coffee, true),
        controller.edit_task(badges, "Print badges", "2026-10-23"),
    );
    assert_eq!(a.unwrap(), TaskStatus::Completed);
    assert_eq!(b.unwrap(), TaskStatus::Completed);
    assert!(matches!(c, Err(BoardError::AlreadyInFlight(_))));
    assert_eq!(controller.page_view().progress_label, "3/5 (60%)");
}

#[tokio::test]
async fn test_cancelled_requests_are_ignored() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let inner = populate_service(&reference_seminar(), None);
    let badges = task_named(&inner, "Print badges");
    let tasks = inner.tasks(SEMINAR).unwrap();
    let controller = load_page(SlowService { inner, yields: 3 }, tasks, dir.path());

    let (toggled, cancelled) = tokio::join!(
        controller.toggle_completion(badges, true),
        async {
            tokio::task::yield_now().await;
            let disabled = controller.page_view().row(badges).unwrap().disabled;
            (disabled, controller.cancel(badges))
        },
    );
    assert_eq!(cancelled, (true, true));
    assert!(matches!(toggled, Err(BoardError::Stale(_))));

    // The server did apply it, but this page ignored the answer
    assert!(controller.service().inner.task(badges).unwrap().unwrap().completed());
    let row = controller.page_view().row(badges).cloned().unwrap();
    assert!(row.checked == false);
    assert!(row.disabled == false);
}

#[tokio::test]
async fn test_calendar() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let service = populate_service(&reference_seminar(), None);
    let badges = task_named(&service, "Print badges");
    let tasks = service.tasks(SEMINAR).unwrap();
    let controller = load_page(service, tasks, dir.path());

    let grid = controller.calendar_grid();
    assert_eq!(grid.label(), "2026-10");
    assert_eq!(grid.cells().len(), 42);
    assert_eq!(grid.cell(date(2026, 10, 10)).unwrap().dot(), Some(DotColor::Overdue));
    assert_eq!(grid.cell(date(2026, 10, 22)).unwrap().dot(), Some(DotColor::Accent));
    assert_eq!(grid.cell(date(2026, 10, 22)).unwrap().caption(), Some("0/1".to_string()));
    assert!(grid.cell(date(2026, 10, 18)).unwrap().is_today());

    // The calendar is a snapshot of the page load
    controller.toggle_completion(badges, true).await.unwrap();
    assert_eq!(controller.calendar_grid().cell(date(2026, 10, 22)).unwrap().caption(), Some("0/1".to_string()));

    assert_eq!(controller.next_month().label(), "2026-11");
    assert_eq!(controller.next_month().cells().len(), 42);
    assert_eq!(controller.prev_month().label(), "2026-11");
    assert_eq!(controller.prev_month().label(), "2026-10");
}

#[tokio::test]
async fn test_open_groups_are_not_restored() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let service = populate_service(&reference_seminar(), None);
    let tasks = service.tasks(SEMINAR).unwrap();
    let controller = load_page(service, tasks.clone(), dir.path());
    assert_eq!(controller.toggle_group(date(2026, 10, 30)), Some(true));
    assert!(controller.page_view().group("2026-10-30").unwrap().expanded);

    // Reload the page
    let service = populate_service(&reference_seminar(), None);
    let reloaded = load_page(service, tasks, dir.path());
    assert!(reloaded.with_state(|state| state.open_dates().contains("2026-10-30")));
    assert!(reloaded.page_view().groups.iter().all(|g| g.expanded == false));
}
