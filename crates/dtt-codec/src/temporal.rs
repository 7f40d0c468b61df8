//! DA, DT and TM text forms.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::{Captures, Regex};

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})\.?(\d{2})\.?(\d{2})$").expect("Invalid DA regex")
});

/// `YYYY[MM[DD[HH[MM[SS[.F{1,6}]]]]]][&ZZXX]`
static DATETIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})(?:(\d{2})(?:(\d{2})(?:(\d{2})(?:(\d{2})(?:(\d{2})(?:\.(\d{1,6}))?)?)?)?)?)?(?:[+-]\d{4})?$",
    )
    .expect("Invalid DT regex")
});

/// `HH[MM[SS[.F{1,6}]]]`, or the legacy `HH:MM[:SS[.F{1,6}]]`.
static TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})(?::?(\d{2})(?::?(\d{2})(?:\.(\d{1,6}))?)?)?$").expect("Invalid TM regex")
});

fn number(captures: &Captures<'_>, index: usize, default: u32) -> u32 {
    captures
        .get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default)
}

fn nanos(captures: &Captures<'_>, index: usize) -> u32 {
    captures.get(index).map_or(0, |m| {
        let digits = m.as_str();
        let micros: u32 = format!("{digits:0<6}").parse().unwrap_or(0);
        micros * 1_000
    })
}

/// Parse DA text (`YYYYMMDD` or `YYYY.MM.DD`).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let captures = DATE_REGEX.captures(text)?;
    let year = captures.get(1)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, number(&captures, 2, 1), number(&captures, 3, 1))
}

/// Parse DT text of any precision. Missing components take their lowest
/// value; a UTC offset suffix is ignored.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let captures = DATETIME_REGEX.captures(text)?;
    let year = captures.get(1)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(&captures, 2, 1), number(&captures, 3, 1))?;
    let time = NaiveTime::from_hms_nano_opt(
        number(&captures, 4, 0),
        number(&captures, 5, 0),
        number(&captures, 6, 0),
        nanos(&captures, 7),
    )?;
    Some(NaiveDateTime::new(date, time))
}

/// Parse TM text of any precision.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let captures = TIME_REGEX.captures(text)?;
    NaiveTime::from_hms_nano_opt(
        number(&captures, 1, 0),
        number(&captures, 2, 0),
        number(&captures, 3, 0),
        nanos(&captures, 4),
    )
}

/// DA text `YYYYMMDD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// DT text `YYYYMMDDHHMMSS.FFFFFF`.
pub fn format_datetime(datetime: NaiveDateTime) -> String {
    format!("{}{}", format_date(datetime.date()), format_time(datetime.time()))
}

/// TM text `HHMMSS.FFFFFF`.
pub fn format_time(time: NaiveTime) -> String {
    format!(
        "{:02}{:02}{:02}.{:06}",
        time.hour(),
        time.minute(),
        time.second(),
        time.nanosecond() / 1_000
    )
}
