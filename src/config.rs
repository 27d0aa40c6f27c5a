//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// The product name sent in the `User-Agent` header of every request (e.g. `SeminarBoard/0.1.0`).
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("SeminarBoard".to_string())));

/// Name of the anti-forgery cookie set by the server, and of the header it must be echoed in
pub const CSRF_COOKIE_NAME: &str = "csrftoken";
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

/// Key under which the expanded date groups are stored
pub const OPEN_DATES_STORAGE_KEY: &str = "seminar_detail_open_dates";

/// How long a date group stays highlighted after its calendar cell has been clicked
pub const HIGHLIGHT_DURATION_MS: i64 = 1000;

/// How long a submitted seminar form stays locked if the page does not navigate away
pub const SUBMIT_GUARD_MS: i64 = 10_000;

/// Bounds of the seminar capacity field
pub const MIN_CAPACITY: u32 = 1;
pub const MAX_CAPACITY: u32 = 999_999;

/// How long a visited link keeps its "visited" styling
pub const VISITED_LINK_LIFETIME_MONTHS: u32 = 3;

/// Longest task name the server accepts
pub const MAX_TASK_NAME_LEN: usize = 200;

/// Returns the `User-Agent` string built from [`PRODUCT_NAME`]
pub fn user_agent() -> String {
    let product = PRODUCT_NAME.lock()
        .map(|name| name.clone())
        .unwrap_or_else(|_| "SeminarBoard".to_string());
    format!("{}/{}", product, env!("CARGO_PKG_VERSION"))
}
