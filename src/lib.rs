//! This crate provides the client side of a seminar preparation board.
//!
//! Tasks are displayed in date groups (one group per deadline), along with completion counters and a month
//! calendar. A [`Board`](board::Board) holds this model, and [`view`] projects it into what a UI displays.
//!
//! Changes are sent to a task service: the HTTP [`Client`](client::Client) for a real server, or a
//! [`LocalTaskService`](local::LocalTaskService) that answers from memory. \
//! A [`SeminarController`](controller::SeminarController) ties a board, a calendar, the persisted UI state and a
//! service together, the way a seminar page does.

pub mod traits;

pub mod task;
pub use task::{Task, TaskId, TaskStatus};
pub mod board;
pub use board::Board;
pub mod calendar;
pub mod view;
pub mod templates;
pub mod seminar_form;

pub mod reply;
pub mod error;
pub use error::BoardError;
pub mod resource;
pub mod client;
pub mod local;
pub mod mock_behaviour;
pub mod state;
pub mod controller;
pub use controller::SeminarController;

pub mod config;
pub mod utils;
