//! Hardware abstraction traits for SHIELD firmware
//!
//! This crate defines the collaborators the core logic talks to. Board
//! support crates implement these traits; the core never touches
//! registers, radios or LEDs directly.

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod indicator;
pub mod keys;
pub mod net;
pub mod time;

pub use indicator::{Indicator, Rgb};
pub use keys::KeyProvider;
pub use net::{DatagramSocket, Network};
pub use time::{DateTime, HardwareClock, TimeSource};
