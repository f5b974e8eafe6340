//! Common regex patterns for date and time canonicalization.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ISO-style dates: 2025-07-15, 2025/07/15, 2025.07.15
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    // Month-name first: "July 15, 2025", "Jul 15th 2025"
    pub static ref DATE_MDY_NAMED: Regex = Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\s*,?\s+(\d{4})\b"
    ).unwrap();

    // Day first: "15 July 2025", "15th Jul, 2025"
    pub static ref DATE_DMY_NAMED: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s*,?\s+(\d{4})\b"
    ).unwrap();

    // Numeric month-first dates: 7/15/2025, 07-15-25
    pub static ref DATE_MDY_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    // All-day sentinel phrases
    pub static ref TIME_ALL_DAY: Regex = Regex::new(
        r"(?i)^\s*all[\s\-]?day\s*$"
    ).unwrap();

    // 2:30pm, 2:30 PM, 2:30:00 p.m.
    pub static ref TIME_12H: Regex = Regex::new(
        r"(?i)\b(\d{1,2}):(\d{2})(?::\d{2})?\s*([ap])\.?m\.?\b"
    ).unwrap();

    // 2pm, 2 PM
    pub static ref TIME_HOUR_AMPM: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s*([ap])\.?m\.?\b"
    ).unwrap();

    // Bare 24-hour clock: 14:30. Tried last, after the am/pm forms.
    pub static ref TIME_24H: Regex = Regex::new(
        r"\b(\d{1,2}):(\d{2})\b"
    ).unwrap();
}
