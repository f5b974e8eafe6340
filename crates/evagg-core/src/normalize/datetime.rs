//! Free-text date and time canonicalization.
//!
//! Both entry points are pure and total: any interpretation failure yields
//! an in-band fallback (empty string for dates, the original text for
//! times), never an error. Canonical input round-trips to itself.

use chrono::NaiveDate;
use tracing::debug;

use super::patterns::{
    DATE_DMY_NAMED, DATE_MDY_NAMED, DATE_MDY_NUMERIC, DATE_YMD, TIME_12H, TIME_24H,
    TIME_ALL_DAY, TIME_HOUR_AMPM,
};

/// Sentinel for events without a specific time.
pub const ALL_DAY: &str = "All Day";

/// Parse free-form date text into ISO `YYYY-MM-DD`.
///
/// Non-date tokens surrounding a recognizable date are tolerated and
/// ignored. Returns an empty string when nothing parses.
pub fn parse_date(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    if let Some(caps) = DATE_YMD.captures(text) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    if let Some(caps) = DATE_MDY_NAMED.captures(text) {
        let month = month_name_to_number(&caps[1]);
        let day: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    if let Some(caps) = DATE_DMY_NAMED.captures(text) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month = month_name_to_number(&caps[2]);
        let year: i32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    if let Some(caps) = DATE_MDY_NUMERIC.captures(text) {
        let first: u32 = caps[1].parse().unwrap_or(0);
        let second: u32 = caps[2].parse().unwrap_or(0);
        let year = parse_year(&caps[3]);
        // Month-first reading, with a day-first fallback for feeds that
        // write 15/7/2025.
        if let Some(date) = NaiveDate::from_ymd_opt(year, first, second) {
            return date.format("%Y-%m-%d").to_string();
        }
        if let Some(date) = NaiveDate::from_ymd_opt(year, second, first) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    debug!("failed to parse date {text:?}");
    String::new()
}

/// Parse free-form time text into `HH:MM AM/PM`.
///
/// Recognizes the all-day phrases ("all day", "all-day", "allday") as the
/// [`ALL_DAY`] sentinel. Unlike dates, an unparseable time returns the
/// original text unchanged: a human-readable string like "doors at dusk"
/// is worth more in the sheet than an empty cell.
pub fn parse_time(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    if TIME_ALL_DAY.is_match(text) {
        return ALL_DAY.to_string();
    }

    if let Some(caps) = TIME_12H.captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(0);
        let minute: u32 = caps[2].parse().unwrap_or(0);
        if (1..=12).contains(&hour) && minute < 60 {
            return format!("{:02}:{:02} {}", hour, minute, period(&caps[3]));
        }
    }

    if let Some(caps) = TIME_HOUR_AMPM.captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(0);
        if (1..=12).contains(&hour) {
            return format!("{:02}:00 {}", hour, period(&caps[2]));
        }
    }

    if let Some(caps) = TIME_24H.captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(0);
        let minute: u32 = caps[2].parse().unwrap_or(0);
        if hour < 24 && minute < 60 {
            return convert_24h_to_12h(hour, minute);
        }
    }

    debug!("could not parse time {text:?}, returning original");
    text.to_string()
}

/// Split a combined date+time string into canonical parts.
///
/// Returns `("", "")` when no date is recognizable; the time part is empty
/// when the text carries no time component.
pub fn parse_datetime(text: &str) -> (String, String) {
    let date = parse_date(text);
    if date.is_empty() {
        return (String::new(), String::new());
    }

    let time = if TIME_12H.is_match(text) || TIME_HOUR_AMPM.is_match(text) || TIME_24H.is_match(text)
    {
        parse_time(text)
    } else {
        String::new()
    };

    (date, time)
}

/// True when the text contains a recognizable date.
pub fn validate_date(text: &str) -> bool {
    !parse_date(text).is_empty()
}

/// True when the text canonicalizes to a clock time or the all-day sentinel.
pub fn validate_time(text: &str) -> bool {
    let parsed = parse_time(text);
    parsed == ALL_DAY || TIME_12H.is_match(&parsed)
}

fn period(marker: &str) -> &'static str {
    if marker.eq_ignore_ascii_case("a") {
        "AM"
    } else {
        "PM"
    }
}

fn convert_24h_to_12h(hour: u32, minute: u32) -> String {
    let period = if hour < 12 { "AM" } else { "PM" };
    let hour_12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour_12:02}:{minute:02} {period}")
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: 00-50 read as 2000s, 51-99 as 1900s.
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

fn month_name_to_number(name: &str) -> u32 {
    let lower = name.to_lowercase();
    match &lower[..3.min(lower.len())] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => 0,
    }
}
