//! Some utility functions

use std::io::{stdin, stdout, Read, Write};

use chrono::{Datelike, NaiveDate, Weekday};

use crate::board::Board;
use crate::calendar::MonthGrid;
use crate::view::PageView;

pub mod comparison;

/// The ISO `YYYY-MM-DD` key used to identify date groups and calendar cells
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a date key. Returns `None` for anything that is not a valid ISO date
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}

/// Whether a deadline input has the `YYYY-MM-DD` shape (4 digits, dash, 2 digits, dash, 2 digits), and nothing
/// else apart from surrounding whitespace.
///
/// This is only a shape check; whether it is an actual calendar date is up to the server.
pub fn looks_like_date_input(input: &str) -> bool {
    let bytes = input.trim().as_bytes();
    if bytes.len() != 10 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

/// Format a deadline the way group headers display it, e.g. `2026/10/18 (Sun)`
pub fn format_date_with_weekday(date: NaiveDate) -> String {
    format!("{} ({})", date.format("%Y/%m/%d"), weekday_label(date.weekday()))
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Describe `target` relatively to `reference`, e.g. `today`, `in 3 days` or `2 days ago`
pub fn describe_relative_days(target: NaiveDate, reference: NaiveDate) -> String {
    let delta = target.signed_duration_since(reference).num_days();
    match delta {
        0 => "today".to_string(),
        1 => "in 1 day".to_string(),
        -1 => "1 day ago".to_string(),
        d if d > 0 => format!("in {} days", d),
        d => format!("{} days ago", -d),
    }
}


/// A debug utility that pretty-prints a board
pub fn print_board(board: &Board) {
    let page = PageView::project(board);
    println!("PROGRESS {}", page.progress_label);
    for group in &page.groups {
        let marker = if group.expanded { "v" } else { ">" };
        print!("{} {} ({})  {}", marker, group.deadline_display, group.relative_text, group.completed_label);
        match &group.overdue_label {
            Some(label) => println!("  {}", label),
            None => println!(),
        }
        for row in &group.rows {
            let completion = if row.checked { "✓" } else { " " };
            let busy = if row.disabled { "…" } else { " " };
            println!("    {}{} {}\t{}\t[{}]", completion, busy, row.name, row.task_id, row.css_class);
        }
    }
}

/// A debug utility that pretty-prints a calendar month
pub fn print_month(grid: &MonthGrid) {
    println!("{}", grid.label());
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");
    for week in grid.weeks() {
        let line: Vec<String> = week.iter()
            .map(|cell| {
                let dot = if cell.dot().is_some() { "•" } else { " " };
                if cell.in_month() {
                    format!("{:>3}{}", cell.day(), dot)
                } else {
                    "    ".to_string()
                }
            })
            .collect();
        println!("{}", line.join(""));
    }
}


/// Wait for the user to press enter
pub fn pause() {
    let mut stdout = stdout();
    let _ = stdout.write_all(b"Press Enter to continue...");
    let _ = stdout.flush();
    let _ = stdin().read_exact(&mut [0]);
}
