//! This is an example of how seminar-board can be used.
//! This binary simply toggles all completion statuses of the tasks of a seminar.
//!
//! It talks to the server at `SEMINAR_BOARD_URL` if this variable is set (the tasks are then read from the
//! calendar payload of the seminar page, saved in the file `SEMINAR_BOARD_PAGE_DATA`), and to an in-memory
//! service otherwise.

use std::error::Error;
use std::path::Path;

use chrono::{Local, NaiveDate, Duration};

use seminar_board::calendar::CalendarSummaries;
use seminar_board::client::Client;
use seminar_board::local::LocalTaskService;
use seminar_board::resource::Resource;
use seminar_board::state::UiState;
use seminar_board::traits::TaskService;
use seminar_board::utils::{pause, print_board, print_month};
use seminar_board::SeminarController;

const STATE_FOLDER: &str = "demo_state";


#[tokio::main]
async fn main() {
    env_logger::init();

    println!("This example toggles the completion status of every task of a seminar.");
    println!("Set SEMINAR_BOARD_URL, SEMINAR_BOARD_CSRF_TOKEN, SEMINAR_BOARD_SEMINAR_ID and SEMINAR_BOARD_PAGE_DATA to use an actual server.");
    println!("You can also set the RUST_LOG environment variable to display more info about the requests.");
    println!("");

    let today = Local::now().date_naive();
    if let Err(err) = std::fs::create_dir_all(STATE_FOLDER) {
        log::warn!("Unable to create {}: {}", STATE_FOLDER, err);
    }

    let result = match Resource::from_env() {
        Ok(resource) => {
            println!("This will use the following settings:");
            println!("  * URL = {}", resource.url());
            pause();
            run_against_server(resource, today).await
        },
        Err(_) => {
            println!("SEMINAR_BOARD_URL is not set, using an in-memory service.");
            run_locally(today).await
        },
    };

    if let Err(err) = result {
        log::error!("Unable to toggle tasks: {}", err);
    }
}

async fn run_against_server(resource: Resource, today: NaiveDate) -> Result<(), Box<dyn Error>> {
    let seminar = std::env::var("SEMINAR_BOARD_SEMINAR_ID")?.parse::<u64>()?;
    let page_data = std::fs::read_to_string(std::env::var("SEMINAR_BOARD_PAGE_DATA")?)?;
    let tasks = CalendarSummaries::parse(&page_data)?.tasks();

    let client = Client::from_resource(resource)?;
    let state = UiState::load_or_new(&UiState::default_path(Path::new(STATE_FOLDER), &seminar.to_string()));
    let controller = SeminarController::from_page(client, seminar, tasks, Some(&page_data), state, today);
    toggle_all_tasks(&controller).await;
    Ok(())
}

async fn run_locally(today: NaiveDate) -> Result<(), Box<dyn Error>> {
    let seminar = 1;
    let service = LocalTaskService::new(today);
    service.add_task(seminar, "Reserve the room", today - Duration::days(3), false)?;
    service.add_task(seminar, "Send the agenda", today - Duration::days(3), true)?;
    service.add_task(seminar, "Print badges", today + Duration::days(4), false)?;
    service.add_task(seminar, "Order coffee", today + Duration::days(12), false)?;
    let tasks = service.tasks(seminar)?;

    let state = UiState::load_or_new(&UiState::default_path(Path::new(STATE_FOLDER), "local"));
    let controller = SeminarController::from_page(service, seminar, tasks, None, state, today);
    toggle_all_tasks(&controller).await;
    Ok(())
}

async fn toggle_all_tasks<S: TaskService + Sync>(controller: &SeminarController<S>) {
    println!("---- before -----");
    controller.with_board(print_board);
    print_month(&controller.calendar_grid());

    let tasks: Vec<_> = controller.with_board(|board| {
        board.groups()
            .flat_map(|group| group.tasks().iter())
            .map(|task| (task.id(), task.completed()))
            .collect()
    });

    let mut n_toggled = 0;
    for (id, completed) in tasks {
        match controller.toggle_completion(id, !completed).await {
            Ok(_) => n_toggled += 1,
            Err(err) => println!("Task {}: {}", id, err.user_message()),
        }
    }
    println!("{} tasks toggled.", n_toggled);

    println!("---- after -----");
    controller.with_board(print_board);
}
