//! Configuration structures
//!
//! Every tunable has a named default here; nothing downstream hardcodes
//! these values.

/// Seconds a freshly generated tag stays valid
pub const DEFAULT_VALIDITY_WINDOW_SECS: u64 = 900;

/// Network time queries per synchronization
///
/// The first round trip after association is frequently stale, so at least
/// two are made.
pub const DEFAULT_SYNC_ATTEMPTS: u8 = 2;

/// Delay between network time queries
pub const DEFAULT_SYNC_RETRY_BACKOFF_MS: u32 = 2000;

/// Delay between hardware clock presence probes
pub const DEFAULT_PRESENCE_BACKOFF_MS: u32 = 10;

/// Maximum accepted SNTP stratum level
///
/// Stratum 1 = primary servers, 2 = secondary, 3 = tertiary, 16 = unsynchronized
pub const DEFAULT_MAX_STRATUM: u8 = 3;

/// Clock synchronization policy
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Network time queries per synchronization (minimum 1)
    pub sync_attempts: u8,
    /// Delay between network time queries in milliseconds
    pub sync_retry_backoff_ms: u32,
    /// Delay between hardware clock presence probes in milliseconds
    pub presence_backoff_ms: u32,
    /// Give up waiting for the hardware clock after this many probes
    ///
    /// `None` waits forever: the device is useless without a clock.
    pub presence_max_attempts: Option<u32>,
    /// Accept network readings earlier than the hardware clock
    pub allow_rewind: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            sync_attempts: DEFAULT_SYNC_ATTEMPTS,
            sync_retry_backoff_ms: DEFAULT_SYNC_RETRY_BACKOFF_MS,
            presence_backoff_ms: DEFAULT_PRESENCE_BACKOFF_MS,
            presence_max_attempts: None,
            allow_rewind: false,
        }
    }
}

/// Tag generation configuration
#[derive(Debug, Clone)]
pub struct TagConfig {
    /// Seconds between a tag's creation and expiry (must be non-zero)
    pub validity_window_secs: u64,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            validity_window_secs: DEFAULT_VALIDITY_WINDOW_SECS,
        }
    }
}

/// SNTP client configuration
#[derive(Debug, Clone)]
pub struct SntpConfig {
    /// Maximum accepted stratum level (1-15)
    pub max_stratum: u8,
}

impl Default for SntpConfig {
    fn default() -> Self {
        Self {
            max_stratum: DEFAULT_MAX_STRATUM,
        }
    }
}

/// Network credentials
///
/// Provisioned per unit; there is deliberately no `Default`.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

/// Top-level device configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub clock: ClockConfig,
    pub tag: TagConfig,
    pub network: NetworkConfig,
}

impl DeviceConfig {
    /// Default clock and tag policy with the given credentials
    pub fn new(network: NetworkConfig) -> Self {
        Self {
            clock: ClockConfig::default(),
            tag: TagConfig::default(),
            network,
        }
    }
}
