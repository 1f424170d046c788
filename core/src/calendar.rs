//! Calendar date/time conversions using O(1) algorithms
//!
//! Implements Howard Hinnant's civil_from_days and days_from_civil algorithms.
//! Reference: http://howardhinnant.github.io/date_algorithms.html
//!
//! The hardware clock is written as year/month/day/hour/minute/second and
//! read back as Unix seconds, so both directions live here together with
//! the human-readable `DD.MM.YYYY HH:MM:SS` rendering.
//!
//! Limitations:
//! - Valid range: 1970-01-01 up to year 65535 (u16 year)
//! - UTC only (no timezone support)
//! - No leap seconds

use core::fmt::Write;

use heapless::String;
use shield_hal::DateTime;

const SECONDS_PER_DAY: u64 = 86400;

/// Longest rendering of either time format
///
/// A u64 has at most 20 decimal digits; `DD.MM.YYYYY HH:MM:SS` is 20 chars.
pub const TIME_STRING_LEN: usize = 20;

/// Convert Unix timestamp to calendar date/time
///
/// Returns `None` once the year no longer fits the RTC's u16.
pub fn unix_to_datetime(unix_secs: u64) -> Option<DateTime> {
    let days_since_epoch = unix_secs / SECONDS_PER_DAY;
    let secs_today = unix_secs % SECONDS_PER_DAY;

    let hour = (secs_today / 3600) as u8;
    let minute = ((secs_today % 3600) / 60) as u8;
    let second = (secs_today % 60) as u8;

    let days = i64::try_from(days_since_epoch).ok()?;
    let (year, month, day) = civil_from_days(days);
    let year = u16::try_from(year).ok()?;

    DateTime::new(year, month, day, hour, minute, second)
}

/// Convert calendar date/time to Unix timestamp
///
/// Dates before the Unix epoch clamp to 0.
pub fn datetime_to_unix(dt: &DateTime) -> u64 {
    let days_since_epoch = days_from_civil(dt.year(), dt.month(), dt.day());
    if days_since_epoch < 0 {
        return 0;
    }

    (days_since_epoch as u64) * SECONDS_PER_DAY
        + (dt.hour() as u64) * 3600
        + (dt.minute() as u64) * 60
        + (dt.second() as u64)
}

/// Render Unix seconds as `DD.MM.YYYY HH:MM:SS`
pub fn format_human_readable(unix_secs: u64) -> String<TIME_STRING_LEN> {
    let mut out = String::new();
    if let Some(dt) = unix_to_datetime(unix_secs) {
        // Capacity covers the widest u16 year, so the write cannot fail
        let _ = write!(
            out,
            "{:02}.{:02}.{:04} {:02}:{:02}:{:02}",
            dt.day(),
            dt.month(),
            dt.year(),
            dt.hour(),
            dt.minute(),
            dt.second()
        );
    }
    out
}

/// Render Unix seconds as a decimal integer
pub fn format_unix(unix_secs: u64) -> String<TIME_STRING_LEN> {
    let mut out = String::new();
    let _ = write!(out, "{}", unix_secs);
    out
}

/// Convert days since Unix epoch to civil date (year, month, day)
fn civil_from_days(days_since_epoch: i64) -> (i64, u8, u8) {
    // Shift epoch from 1970-01-01 to 0000-03-01 so the leap day ends the year
    let z = days_since_epoch + 719468;

    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64; // day of era [0, 146096]

    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // [0, 399]
    let y = (yoe as i64) + era * 400;

    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // 0 = March, 11 = February

    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;

    let year = if m <= 2 { y + 1 } else { y };

    (year, m, d)
}

/// Convert civil date (year, month, day) to days since Unix epoch
fn days_from_civil(year: u16, month: u8, day: u8) -> i64 {
    let y = year as i64;
    let m = month as i64;
    let d = day as i64;

    // March = month 0, February = month 11
    let (y, m) = if m <= 2 { (y - 1, m + 9) } else { (y, m - 3) };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u64;
    let doy = (153 * (m as u64) + 2) / 5 + (d as u64) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;

    era * 146097 + (doe as i64) - 719468
}
