//! Platform-agnostic core logic for SHIELD firmware
//!
//! A SHIELD unit runs as a stationary Beacon or a mobile Neuron and emits
//! tags describing its health status. This crate holds the logic shared by
//! every board: the clock authority reconciling network time with the
//! battery-backed RTC, the health state, and the tag protocol. It has NO
//! hardware dependencies; boards supply the `shield-hal` collaborators.
//!
//! ## Boot sequence
//! ```ignore
//! let mut device = Device::new(identity, DeviceConfig::new(credentials), peripherals);
//! device.start()?; // RTC wait -> network association -> SNTP sync
//! device.report_status();
//! let tag = device.generate_tag()?;
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod calendar;
pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod health;
pub mod identity;
pub mod sntp;
pub mod tag;

#[cfg(test)]
mod mock;

pub use clock::{ClockAuthority, DeviceTime, ReadingSource, SyncOutcome, TimeFormat, TimeReading};
pub use config::{ClockConfig, DeviceConfig, NetworkConfig, SntpConfig, TagConfig};
pub use device::{Device, Peripherals};
pub use error::{ClockError, DeviceError, IdentityError, SntpError, TagError};
pub use health::{HealthClassification, HealthState, IndicatorColor};
pub use identity::{DeviceIdentity, Role};
pub use sntp::SntpTimeSource;
pub use tag::{EncodedTag, Tag, TagEncoder, SCHEMA_VERSION};
