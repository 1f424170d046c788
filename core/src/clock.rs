//! Clock authority: one trustworthy "now" from a network time source and a
//! battery-backed hardware clock
//!
//! ## Architecture
//! - The hardware clock is the single source of truth during operation; it
//!   keeps ticking through network outages
//! - The network time source is only consulted by [`ClockAuthority::synchronize`]
//!   to correct drift or an unset clock
//! - Readings of zero, and readings earlier than the hardware clock (unless
//!   [`ClockConfig::allow_rewind`] is set), count as failed attempts
//! - If every attempt fails the hardware clock keeps its value
//!
//! ## Usage
//! ```ignore
//! let mut clock = ClockAuthority::new(rtc, sntp, delay, ClockConfig::default());
//! clock.initialize()?;
//! match clock.synchronize()? {
//!     SyncOutcome::Synchronized(r) => info!("Synced to {}", r.epoch),
//!     SyncOutcome::FellBack(r) => warn!("Using hardware clock {}", r.epoch),
//! }
//! let stamp = clock.now(TimeFormat::HumanReadable);
//! ```

use embedded_hal::delay::DelayNs;
use heapless::String;
use shield_hal::{HardwareClock, TimeSource};

use crate::calendar::{self, TIME_STRING_LEN};
use crate::config::ClockConfig;
use crate::error::ClockError;

/// Rendered device time
pub type DeviceTime = String<TIME_STRING_LEN>;

/// Output format for [`ClockAuthority::now`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeFormat {
    /// Decimal Unix epoch seconds
    Unix,
    /// `DD.MM.YYYY HH:MM:SS` (UTC)
    HumanReadable,
}

/// Where a time reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadingSource {
    Network,
    Hardware,
}

/// A Unix epoch value tagged with its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeReading {
    pub epoch: u64,
    pub source: ReadingSource,
    /// False when the hardware clock could not be read
    pub valid: bool,
}

/// Result of a synchronization run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncOutcome {
    /// A network reading was written to the hardware clock
    Synchronized(TimeReading),
    /// No usable network reading; the hardware clock stays authoritative
    FellBack(TimeReading),
}

impl SyncOutcome {
    pub fn reading(&self) -> TimeReading {
        match self {
            SyncOutcome::Synchronized(r) | SyncOutcome::FellBack(r) => *r,
        }
    }
}

/// Owner of the hardware clock and its only writer
pub struct ClockAuthority<C, T, D> {
    rtc: C,
    source: T,
    delay: D,
    config: ClockConfig,
    initialized: bool,
    synced: bool,
    last: Option<TimeReading>,
}

impl<C, T, D> ClockAuthority<C, T, D>
where
    C: HardwareClock,
    T: TimeSource,
    D: DelayNs,
{
    pub fn new(rtc: C, source: T, delay: D, config: ClockConfig) -> Self {
        Self {
            rtc,
            source,
            delay,
            config,
            initialized: false,
            synced: false,
            last: None,
        }
    }

    /// Wait for the hardware clock to report present
    ///
    /// Probes every `presence_backoff_ms`. Only returns an error when
    /// `presence_max_attempts` is set and exhausted.
    pub fn initialize(&mut self) -> Result<(), ClockError> {
        let mut probes: u32 = 0;
        loop {
            if self.rtc.is_present() {
                self.initialized = true;
                info!("Clock started.");
                return Ok(());
            }

            probes = probes.saturating_add(1);
            warn!("Couldn't find RTC! (probe {})", probes);

            if let Some(max) = self.config.presence_max_attempts {
                if probes >= max {
                    error!("Hardware clock absent after {} probes", probes);
                    return Err(ClockError::HardwareUnavailable);
                }
            }

            self.delay.delay_ms(self.config.presence_backoff_ms);
        }
    }

    /// Correct the hardware clock from the network time source
    ///
    /// Network connectivity must already be up. Every accepted reading is
    /// written to the hardware clock; the last one becomes authoritative.
    pub fn synchronize(&mut self) -> Result<SyncOutcome, ClockError> {
        if !self.initialized {
            return Err(ClockError::NotInitialized);
        }

        info!("Synchronizing date and time with servers...");

        // Last value the hardware clock is known to hold
        let mut floor = self.rtc.read().ok();
        let mut accepted = None;
        let attempts = self.config.sync_attempts.max(1);

        for attempt in 1..=attempts {
            match self.source.fetch_epoch() {
                None => warn!("Network time attempt {} failed", attempt),
                Some(0) => warn!("Network time attempt {} returned zero, ignoring", attempt),
                Some(epoch) if self.is_rewind(epoch, floor) => {
                    warn!(
                        "Network time {} is behind hardware clock {}, ignoring",
                        epoch,
                        floor.unwrap_or(0)
                    );
                }
                Some(epoch) => match self.write_hardware(epoch) {
                    Ok(()) => {
                        debug!("Attempt {}: hardware clock set to {}", attempt, epoch);
                        floor = Some(epoch);
                        accepted = Some(epoch);
                    }
                    Err(e) => warn!("Failed to write hardware clock: {:?}", e),
                },
            }

            if attempt < attempts {
                self.delay.delay_ms(self.config.sync_retry_backoff_ms);
            }
        }

        match accepted {
            Some(epoch) => {
                let reading = TimeReading {
                    epoch,
                    source: ReadingSource::Network,
                    valid: true,
                };
                self.synced = true;
                self.last = Some(reading);
                info!("Clock successfully synchronized! ({})", epoch);
                Ok(SyncOutcome::Synchronized(reading))
            }
            None => {
                let reading = match floor {
                    Some(epoch) => TimeReading {
                        epoch,
                        source: ReadingSource::Hardware,
                        valid: true,
                    },
                    None => TimeReading {
                        epoch: self.last_epoch(),
                        source: ReadingSource::Hardware,
                        valid: false,
                    },
                };
                if reading.valid {
                    self.last = Some(reading);
                }
                warn!(
                    "Network time unavailable, keeping hardware clock ({})",
                    reading.epoch
                );
                Ok(SyncOutcome::FellBack(reading))
            }
        }
    }

    /// Current Unix time from the hardware clock
    ///
    /// A failed read logs and returns the last authoritative value (0 if
    /// there is none).
    pub fn now_epoch(&mut self) -> u64 {
        match self.rtc.read() {
            Ok(epoch) => epoch,
            Err(_) => {
                error!("Failed to read RTC: {:?}", ClockError::HardwareFault);
                self.last_epoch()
            }
        }
    }

    /// Current time from the hardware clock, rendered in `format`
    pub fn now(&mut self, format: TimeFormat) -> DeviceTime {
        let epoch = self.now_epoch();
        match format {
            TimeFormat::Unix => calendar::format_unix(epoch),
            TimeFormat::HumanReadable => calendar::format_human_readable(epoch),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether at least one network reading has reached the hardware clock
    pub fn is_synchronized(&self) -> bool {
        self.synced
    }

    /// Most recent authoritative reading
    pub fn last_reading(&self) -> Option<TimeReading> {
        self.last
    }

    pub fn hardware_clock(&self) -> &C {
        &self.rtc
    }

    pub fn time_source(&self) -> &T {
        &self.source
    }

    fn last_epoch(&self) -> u64 {
        self.last.map(|r| r.epoch).unwrap_or(0)
    }

    fn is_rewind(&self, epoch: u64, floor: Option<u64>) -> bool {
        !self.config.allow_rewind && floor.is_some_and(|f| epoch < f)
    }

    fn write_hardware(&mut self, epoch: u64) -> Result<(), ClockError> {
        let datetime = calendar::unix_to_datetime(epoch).ok_or(ClockError::HardwareFault)?;
        self.rtc
            .write(&datetime)
            .map_err(|_| ClockError::HardwareFault)
    }
}
