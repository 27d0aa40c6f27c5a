//! Checks done on the seminar form before it is sent
//!
//! The form has a list of session dates, a price and a capacity. Price and capacity inputs are filtered as they
//! are typed, and the whole form is validated on submission. A submitted form stays locked for a while, so that
//! it cannot be sent twice.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::{MAX_CAPACITY, MIN_CAPACITY, SUBMIT_GUARD_MS};
use crate::error::BoardError;
use crate::utils::{looks_like_date_input, parse_date_key};

/// How a session date input is styled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateInputState {
    /// Nothing typed yet
    Blank,
    Valid,
    /// Malformed, in the past, or entered twice
    Invalid,
}

impl DateInputState {
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            DateInputState::Blank => None,
            DateInputState::Valid => Some("border-green-300"),
            DateInputState::Invalid => Some("border-red-300"),
        }
    }
}

/// The state of each session date input, in order. Blank inputs are neither valid nor invalid.
///
/// Every occurrence of a repeated date is invalid, not only the second one.
pub fn session_date_states(inputs: &[String], today: NaiveDate) -> Vec<DateInputState> {
    let mut seen = HashSet::new();
    let mut repeated = HashSet::new();
    for value in inputs.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if seen.insert(value) == false {
            repeated.insert(value);
        }
    }

    inputs.iter()
        .map(|value| {
            let value = value.trim();
            if value.is_empty() {
                return DateInputState::Blank;
            }
            let date = if looks_like_date_input(value) { parse_date_key(value) } else { None };
            match date {
                Some(date) if date >= today && repeated.contains(value) == false => DateInputState::Valid,
                _ => DateInputState::Invalid,
            }
        })
        .collect()
}

/// The session dates of the form, blank inputs skipped
pub fn validate_session_dates(inputs: &[String], today: NaiveDate) -> Result<Vec<NaiveDate>, BoardError> {
    let states = session_date_states(inputs, today);
    if states.contains(&DateInputState::Invalid) {
        return Err(BoardError::Validation {
            field: "dates",
            message: "Session dates must not repeat or be in the past".to_string(),
        });
    }
    Ok(inputs.iter().filter_map(|value| parse_date_key(value)).collect())
}

/// What is left of an input once everything but digits is dropped
pub fn sanitize_digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// The price input once it loses focus: leading zeros are dropped, and an unusable value is cleared
pub fn normalize_price(input: &str) -> String {
    let digits = sanitize_digits(input);
    match digits.parse::<u64>() {
        Ok(price) => price.to_string(),
        Err(_) => String::new(),
    }
}

/// A blank price is `None`. Anything but a whole number is refused
pub fn validate_price(input: &str) -> Result<Option<u64>, BoardError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if input.chars().all(|c| c.is_ascii_digit()) == false {
        return Err(price_error());
    }
    input.parse::<u64>().map(Some).map_err(|_| price_error())
}

fn price_error() -> BoardError {
    BoardError::Validation { field: "price", message: "The price must be a whole number, 0 or more".to_string() }
}

/// The capacity input as it is typed: digits only, kept within the allowed bounds
pub fn clamp_capacity(input: &str) -> String {
    let digits = sanitize_digits(input);
    if digits.is_empty() {
        return String::new();
    }
    // Too many digits to parse means way above the maximum anyway
    let capacity = digits.parse::<u64>().unwrap_or(u64::MAX);
    capacity.clamp(u64::from(MIN_CAPACITY), u64::from(MAX_CAPACITY)).to_string()
}

/// A blank capacity is `None`
pub fn validate_capacity(input: &str) -> Result<Option<u32>, BoardError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<u32>() {
        Ok(capacity) if (MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) => Ok(Some(capacity)),
        _ => Err(BoardError::Validation {
            field: "capacity",
            message: format!("The capacity must be between {} and {}", MIN_CAPACITY, MAX_CAPACITY),
        }),
    }
}

/// Prevents a form from being submitted twice.
///
/// A submission locks the form until the page navigates away. If it never does, the lock expires on its own.
#[derive(Clone, Debug, Default)]
pub struct SubmitGuard {
    locked_until: Option<DateTime<Utc>>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        matches!(self.locked_until, Some(until) if now < until)
    }

    pub fn begin(&mut self, now: DateTime<Utc>) -> Result<(), BoardError> {
        if self.is_locked(now) {
            return Err(BoardError::AlreadyInFlight("the seminar form".to_string()));
        }
        self.locked_until = Some(now + Duration::milliseconds(SUBMIT_GUARD_MS));
        Ok(())
    }

    pub fn release(&mut self) {
        self.locked_until = None;
    }
}

/// What a valid seminar form sends
#[derive(Clone, Debug, PartialEq)]
pub struct SeminarSubmission {
    pub session_dates: Vec<NaiveDate>,
    pub price: Option<u64>,
    pub capacity: Option<u32>,
}

/// The inputs of a seminar form
#[derive(Clone, Debug)]
pub struct SeminarForm {
    session_dates: Vec<String>,
    price: String,
    capacity: String,
    guard: SubmitGuard,
}

impl Default for SeminarForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SeminarForm {
    /// An empty form, with a single blank date row
    pub fn new() -> Self {
        Self {
            session_dates: vec![String::new()],
            price: String::new(),
            capacity: String::new(),
            guard: SubmitGuard::new(),
        }
    }

    pub fn session_dates(&self) -> &[String] { &self.session_dates }
    pub fn price(&self) -> &str              { &self.price }
    pub fn capacity(&self) -> &str           { &self.capacity }

    pub fn add_date_row(&mut self) {
        self.session_dates.push(String::new());
    }

    /// Returns `false` if there is no such row
    pub fn set_date(&mut self, index: usize, value: &str) -> bool {
        match self.session_dates.get_mut(index) {
            Some(row) => {
                *row = value.to_string();
                true
            },
            None => false,
        }
    }

    /// The form always keeps one row: removing the last one only clears it
    pub fn remove_date_row(&mut self, index: usize) -> bool {
        if index >= self.session_dates.len() {
            return false;
        }
        if self.session_dates.len() > 1 {
            self.session_dates.remove(index);
        } else {
            self.session_dates[0].clear();
        }
        true
    }

    pub fn date_states(&self, today: NaiveDate) -> Vec<DateInputState> {
        session_date_states(&self.session_dates, today)
    }

    pub fn input_price(&mut self, typed: &str) {
        self.price = sanitize_digits(typed);
    }

    pub fn blur_price(&mut self) {
        self.price = normalize_price(&self.price);
    }

    pub fn input_capacity(&mut self, typed: &str) {
        self.capacity = clamp_capacity(typed);
    }

    pub fn validate(&self, today: NaiveDate) -> Result<SeminarSubmission, BoardError> {
        Ok(SeminarSubmission {
            session_dates: validate_session_dates(&self.session_dates, today)?,
            price: validate_price(&self.price)?,
            capacity: validate_capacity(&self.capacity)?,
        })
    }

    pub fn is_submitting(&self, now: DateTime<Utc>) -> bool {
        self.guard.is_locked(now)
    }

    /// Validate the form and lock it for the submission.
    ///
    /// An invalid form is not locked, so that it can be fixed and sent again.
    pub fn submit(&mut self, now: DateTime<Utc>, today: NaiveDate) -> Result<SeminarSubmission, BoardError> {
        if self.guard.is_locked(now) {
            log::info!("Ignoring a second submission of the seminar form");
            return Err(BoardError::AlreadyInFlight("the seminar form".to_string()));
        }
        let submission = self.validate(today).map_err(|err| {
            log::debug!("Seminar form refused: {}", err);
            err
        })?;
        self.guard.begin(now)?;
        Ok(submission)
    }

    /// Unlock the form, for instance when the server sent it back with errors
    pub fn release(&mut self) {
        self.guard.release();
    }
}
