//! Error types

/// Clock authority errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Hardware clock never reported present within the configured bound
    HardwareUnavailable,
    /// Hardware clock read or write failed
    HardwareFault,
    /// `synchronize()` called before `initialize()` completed
    NotInitialized,
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::HardwareUnavailable => write!(f, "Hardware clock unavailable"),
            Self::HardwareFault => write!(f, "Hardware clock fault"),
            Self::NotInitialized => write!(f, "Clock not initialized"),
        }
    }
}

impl core::error::Error for ClockError {}

/// SNTP query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SntpError {
    /// Socket send/receive failed
    Network,
    /// No response within the socket's receive timeout
    Timeout,
    /// Response too short or not a server reply
    InvalidResponse,
    /// Server stratum too high or unsynchronized
    InvalidStratum,
    /// Server sent an all-zero transmit timestamp
    ZeroTimestamp,
}

impl core::fmt::Display for SntpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Network => write!(f, "Network error"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::InvalidResponse => write!(f, "Invalid response"),
            Self::InvalidStratum => write!(f, "Invalid stratum"),
            Self::ZeroTimestamp => write!(f, "Zero transmit timestamp"),
        }
    }
}

impl core::error::Error for SntpError {}

/// Tag encode/decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TagError {
    /// Output buffer too small for the serialized payload
    BufferTooSmall,
    /// Serializer rejected the record
    Serialization,
    /// A text field exceeds its fixed capacity
    FieldTooLong,
    /// Key material exceeds the supported length
    KeyMaterialTooLong,
    /// Payload carries a schema version this firmware does not understand
    UnsupportedSchema(u32),
    /// Expiry is not after creation, or the window is zero or overflows
    InvalidValidityWindow,
    /// Payload is not a well-formed tag
    Malformed,
}

impl core::fmt::Display for TagError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "Encode error: buffer too small"),
            Self::Serialization => write!(f, "Encode error"),
            Self::FieldTooLong => write!(f, "Field too long"),
            Self::KeyMaterialTooLong => write!(f, "Key material too long"),
            Self::UnsupportedSchema(v) => write!(f, "Unsupported schema version {}", v),
            Self::InvalidValidityWindow => write!(f, "Invalid validity window"),
            Self::Malformed => write!(f, "Malformed tag"),
        }
    }
}

impl core::error::Error for TagError {}

/// Device identity errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdentityError {
    /// Hardware address or contact number exceeds its fixed capacity
    FieldTooLong,
}

impl core::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FieldTooLong => write!(f, "Identity field too long"),
        }
    }
}

impl core::error::Error for IdentityError {}

/// Errors surfaced by [`crate::device::Device`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    Clock(ClockError),
    Tag(TagError),
}

impl core::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Clock(e) => write!(f, "Clock: {}", e),
            Self::Tag(e) => write!(f, "Tag: {}", e),
        }
    }
}

impl core::error::Error for DeviceError {}

impl From<ClockError> for DeviceError {
    fn from(e: ClockError) -> Self {
        DeviceError::Clock(e)
    }
}

impl From<TagError> for DeviceError {
    fn from(e: TagError) -> Self {
        DeviceError::Tag(e)
    }
}
