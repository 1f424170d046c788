//! Time collaborators: the network time query and the battery-backed RTC

/// Calendar date/time as written to an RTC chip (UTC, 1-second resolution)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    /// Build a date/time, rejecting out-of-range components
    ///
    /// Day is only checked against 1..=31; calendar-exact validation is the
    /// job of whoever produced the components.
    pub const fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Option<Self> {
        if month == 0 || month > 12 || day == 0 || day > 31 {
            return None;
        }
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    pub const fn year(&self) -> u16 {
        self.year
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn second(&self) -> u8 {
        self.second
    }
}

/// Network time query (NTP-style)
///
/// One call is one round trip. Implementations must not retry internally;
/// the retry policy belongs to the caller.
pub trait TimeSource {
    /// Unix epoch seconds, or `None` if the query failed
    fn fetch_epoch(&mut self) -> Option<u64>;
}

/// Battery-backed real-time clock
pub trait HardwareClock {
    type Error: core::fmt::Debug;

    /// Whether the clock chip is present and responding
    fn is_present(&mut self) -> bool;

    /// Current time as Unix epoch seconds
    fn read(&mut self) -> Result<u64, Self::Error>;

    /// Overwrite the clock with a calendar date/time
    fn write(&mut self, datetime: &DateTime) -> Result<(), Self::Error>;
}
