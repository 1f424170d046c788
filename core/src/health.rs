//! Health classification and the single current-status holder

use core::cell::Cell;

use critical_section::Mutex;
use serde::{Deserialize, Serialize};
use shield_hal::Rgb;

/// Device health classification, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthClassification {
    Healthy,
    Suspected,
    Positive,
    Recovered,
    SystemFlag,
}

impl HealthClassification {
    pub const ALL: [HealthClassification; 5] = [
        Self::Healthy,
        Self::Suspected,
        Self::Positive,
        Self::Recovered,
        Self::SystemFlag,
    ];

    /// Wire code carried in a tag's `HS` field
    pub const fn code(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Suspected => "Suspected",
            Self::Positive => "Positive",
            Self::Recovered => "Recovered",
            Self::SystemFlag => "SystemFlag",
        }
    }

    /// Indicator color for this classification
    pub const fn color(self) -> IndicatorColor {
        match self {
            Self::Healthy => IndicatorColor::Green,
            Self::Suspected => IndicatorColor::Amber,
            Self::Positive => IndicatorColor::Red,
            Self::Recovered => IndicatorColor::Blue,
            Self::SystemFlag => IndicatorColor::Purple,
        }
    }
}

impl core::fmt::Display for HealthClassification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl core::str::FromStr for HealthClassification {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.code() == s).ok_or(())
    }
}

/// Color codes understood by the status LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorColor {
    Green,
    Amber,
    Red,
    Blue,
    Purple,
}

impl IndicatorColor {
    pub const fn rgb(self) -> Rgb {
        match self {
            Self::Green => Rgb::new(0, 255, 0),
            Self::Amber => Rgb::new(255, 165, 0),
            Self::Red => Rgb::new(255, 0, 0),
            Self::Blue => Rgb::new(0, 0, 255),
            Self::Purple => Rgb::new(128, 0, 128),
        }
    }
}

/// Holder for the device's one current classification
///
/// Readers (indicator refresh, tag generation) may run from interrupt or
/// task context; reads and writes go through a critical section.
pub struct HealthState {
    current: Mutex<Cell<HealthClassification>>,
}

impl HealthState {
    pub const fn new(initial: HealthClassification) -> Self {
        Self {
            current: Mutex::new(Cell::new(initial)),
        }
    }

    pub fn get(&self) -> HealthClassification {
        critical_section::with(|cs| self.current.borrow(cs).get())
    }

    /// Replace the current classification; any transition is allowed
    pub fn set(&self, classification: HealthClassification) {
        critical_section::with(|cs| self.current.borrow(cs).set(classification));
    }

    /// Color the indicator should show right now
    pub fn color(&self) -> IndicatorColor {
        self.get().color()
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new(HealthClassification::Healthy)
    }
}
