//! Device: composition root and lifecycle owner
//!
//! Owns the clock authority, the health state and the identity, and wires
//! them to the board's collaborators. All operations run to completion on
//! the caller's thread of control.

use embedded_hal::delay::DelayNs;
use shield_hal::{HardwareClock, Indicator, KeyProvider, Network, TimeSource};

use crate::clock::{ClockAuthority, DeviceTime, SyncOutcome, TimeFormat};
use crate::config::{DeviceConfig, NetworkConfig};
use crate::error::{DeviceError, TagError};
use crate::health::{HealthClassification, HealthState, IndicatorColor};
use crate::identity::{DeviceIdentity, Role};
use crate::tag::{EncodedTag, TagEncoder};

/// Board collaborators handed to [`Device::new`]
pub struct Peripherals<C, T, D, N, I, K> {
    pub rtc: C,
    pub time_source: T,
    pub delay: D,
    pub network: N,
    pub indicator: I,
    pub keys: K,
}

pub struct Device<C, T, D, N, I, K> {
    identity: DeviceIdentity,
    clock: ClockAuthority<C, T, D>,
    health: HealthState,
    encoder: TagEncoder,
    network: N,
    network_config: NetworkConfig,
    indicator: I,
    keys: K,
    running: bool,
}

impl<C, T, D, N, I, K> Device<C, T, D, N, I, K>
where
    C: HardwareClock,
    T: TimeSource,
    D: DelayNs,
    N: Network,
    I: Indicator,
    K: KeyProvider,
{
    pub fn new(
        identity: DeviceIdentity,
        config: DeviceConfig,
        peripherals: Peripherals<C, T, D, N, I, K>,
    ) -> Self {
        let DeviceConfig {
            clock,
            tag,
            network,
        } = config;
        Self {
            identity,
            clock: ClockAuthority::new(
                peripherals.rtc,
                peripherals.time_source,
                peripherals.delay,
                clock,
            ),
            health: HealthState::default(),
            encoder: TagEncoder::new(&tag),
            network: peripherals.network,
            network_config: network,
            indicator: peripherals.indicator,
            keys: peripherals.keys,
            running: false,
        }
    }

    /// Bring the device up: wait for the hardware clock, associate with the
    /// network, synchronize time
    ///
    /// A failed association or time sync is not fatal; the hardware clock
    /// stays authoritative. Only an absent hardware clock (with a bounded
    /// presence wait) is returned as an error.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        self.clock.initialize()?;

        if self.ensure_connected() {
            self.clock.synchronize()?;
        } else {
            warn!("Network unavailable, skipping clock synchronization");
        }

        self.running = true;
        info!("SHIELD Device {} now running.", self.identity.role());
        Ok(())
    }

    /// Re-run time synchronization on demand
    ///
    /// Returns `None` when the network is down and no attempt was made.
    pub fn resynchronize(&mut self) -> Result<Option<SyncOutcome>, DeviceError> {
        if !self.ensure_connected() {
            warn!("Network unavailable, skipping clock synchronization");
            return Ok(None);
        }
        Ok(Some(self.clock.synchronize()?))
    }

    pub fn device_type(&self) -> Role {
        self.identity.role()
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn device_time(&mut self, format: TimeFormat) -> DeviceTime {
        self.clock.now(format)
    }

    pub fn health_status(&self) -> HealthClassification {
        self.health.get()
    }

    pub fn set_health_status(&self, classification: HealthClassification) {
        debug!("Health status set to {}", classification);
        self.health.set(classification);
    }

    /// Build a fresh tag from the current health status and clock reading
    ///
    /// Never triggers a resynchronization.
    pub fn generate_tag(&mut self) -> Result<EncodedTag, TagError> {
        let now = self.clock.now_epoch();
        let health = self.health.get();
        self.encoder
            .encode(&self.identity, health, now, &self.keys)
            .inspect_err(|e| error!("Tag generation failed: {:?}", e))
    }

    /// Like [`Device::generate_tag`], serializing into a caller buffer
    pub fn generate_tag_into(&mut self, buf: &mut [u8]) -> Result<usize, TagError> {
        let now = self.clock.now_epoch();
        let health = self.health.get();
        self.encoder
            .encode_into(&self.identity, health, now, &self.keys, buf)
    }

    /// Show the current health status on the indicator
    ///
    /// Indicator failures are logged and otherwise ignored.
    pub fn report_status(&mut self) -> IndicatorColor {
        let color = self.health.color();
        let shown = self
            .indicator
            .set_color(color.rgb())
            .and_then(|()| self.indicator.render());
        if shown.is_err() {
            warn!("Indicator not ready, status {:?} not shown", color);
        }
        color
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn clock(&self) -> &ClockAuthority<C, T, D> {
        &self.clock
    }

    fn ensure_connected(&mut self) -> bool {
        if self.network.is_connected() {
            return true;
        }

        info!("Connecting to {}...", self.network_config.ssid);
        match self
            .network
            .connect(self.network_config.ssid, self.network_config.password)
        {
            Ok(()) => {
                info!("Connected.");
                true
            }
            Err(_) => {
                warn!("Failed to connect to {}", self.network_config.ssid);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClockConfig, TagConfig};
    use crate::error::ClockError;
    use crate::mock::{
        MockClock, MockNetwork, NoopDelay, RecordingIndicator, ScriptedTimeSource, StaticKeys,
    };
    use shield_hal::Rgb;

    type TestDevice = Device<
        MockClock,
        ScriptedTimeSource,
        NoopDelay,
        MockNetwork,
        RecordingIndicator,
        StaticKeys,
    >;

    const NETWORK: NetworkConfig = NetworkConfig {
        ssid: "shield-lab",
        password: "hunter22",
    };

    fn device(
        identity: DeviceIdentity,
        rtc: MockClock,
        script: &[Option<u64>],
        network: MockNetwork,
    ) -> TestDevice {
        Device::new(
            identity,
            DeviceConfig::new(NETWORK),
            Peripherals {
                rtc,
                time_source: ScriptedTimeSource::new(script),
                delay: NoopDelay::default(),
                network,
                indicator: RecordingIndicator::default(),
                keys: StaticKeys::new(&[0x10, 0x20], &[0x30, 0x40]),
            },
        )
    }

    fn beacon() -> DeviceIdentity {
        DeviceIdentity::beacon("AA:BB:CC:DD:EE:FF").unwrap()
    }

    #[test]
    fn test_start_synchronizes_clock() {
        let mut dev = device(
            beacon(),
            MockClock::new(0),
            &[Some(1_699_999_000), Some(1_700_000_000)],
            MockNetwork::connected(),
        );
        dev.start().unwrap();

        assert!(dev.is_running());
        assert!(dev.clock().is_synchronized());
        assert_eq!(dev.device_time(TimeFormat::Unix).as_str(), "1700000000");
    }

    #[test]
    fn test_start_connects_network_first() {
        let mut dev = device(
            beacon(),
            MockClock::new(0),
            &[None, Some(1_700_000_000)],
            MockNetwork::default(),
        );
        dev.start().unwrap();

        assert_eq!(
            dev.network.joined,
            Some(("shield-lab".to_string(), "hunter22".to_string()))
        );
        assert!(dev.clock().is_synchronized());
    }

    #[test]
    fn test_start_without_network_keeps_hardware_time() {
        let mut dev = device(
            beacon(),
            MockClock::new(1_642_242_030),
            &[Some(1_700_000_000)],
            MockNetwork::refusing(),
        );
        dev.start().unwrap();

        assert!(dev.is_running());
        assert!(!dev.clock().is_synchronized());
        assert_eq!(dev.clock().time_source().calls(), 0);
        assert_eq!(
            dev.device_time(TimeFormat::HumanReadable).as_str(),
            "15.01.2022 10:20:30"
        );
    }

    #[test]
    fn test_start_fails_when_clock_absent_and_bounded() {
        let mut config = DeviceConfig::new(NETWORK);
        config.clock = ClockConfig {
            presence_max_attempts: Some(3),
            ..ClockConfig::default()
        };
        let mut dev: TestDevice = Device::new(
            beacon(),
            config,
            Peripherals {
                rtc: MockClock::absent_for(u32::MAX, 0),
                time_source: ScriptedTimeSource::new(&[]),
                delay: NoopDelay::default(),
                network: MockNetwork::connected(),
                indicator: RecordingIndicator::default(),
                keys: StaticKeys::new(&[], &[]),
            },
        );

        assert_eq!(
            dev.start(),
            Err(DeviceError::Clock(ClockError::HardwareUnavailable))
        );
        assert!(!dev.is_running());
    }

    #[test]
    fn test_device_type() {
        let dev = device(beacon(), MockClock::new(0), &[], MockNetwork::connected());
        assert_eq!(dev.device_type(), Role::Beacon);

        let neuron = DeviceIdentity::neuron("506583791D47", "9971432991").unwrap();
        let dev = device(neuron, MockClock::new(0), &[], MockNetwork::connected());
        assert_eq!(dev.device_type(), Role::Neuron);
    }

    #[test]
    fn test_generate_tag_beacon_scenario() {
        let mut dev = device(beacon(), MockClock::new(1000), &[], MockNetwork::connected());
        dev.start().unwrap();

        let encoded = dev.generate_tag().unwrap();
        let tag = encoded.tag();
        assert_eq!(tag.health_status(), HealthClassification::Healthy);
        assert_eq!(tag.creation_timestamp(), 1000);
        assert_eq!(tag.expiry_timestamp(), 1900);
        assert_eq!(tag.device_address(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(tag.contact_number(), "");
        assert!(encoded.payload().contains(r#""HS":"Healthy""#));
        assert!(encoded.payload().contains(r#""CT":"1000","ET":"1900""#));
    }

    #[test]
    fn test_generate_tag_uses_current_health() {
        let mut dev = device(beacon(), MockClock::new(1000), &[], MockNetwork::connected());
        dev.set_health_status(HealthClassification::Positive);
        assert_eq!(dev.health_status(), HealthClassification::Positive);

        let encoded = dev.generate_tag().unwrap();
        assert_eq!(encoded.tag().health_status(), HealthClassification::Positive);
    }

    #[test]
    fn test_generate_tag_does_not_resync() {
        let mut dev = device(
            beacon(),
            MockClock::new(0),
            &[Some(1_700_000_000), Some(1_700_000_001), Some(1_800_000_000)],
            MockNetwork::connected(),
        );
        dev.start().unwrap();
        let calls = dev.clock().time_source().calls();

        let encoded = dev.generate_tag().unwrap();
        assert_eq!(dev.clock().time_source().calls(), calls);
        assert_eq!(encoded.tag().creation_timestamp(), 1_700_000_001);
    }

    #[test]
    fn test_generate_tag_encode_failure_is_reported() {
        let mut config = DeviceConfig::new(NETWORK);
        config.tag = TagConfig {
            validity_window_secs: 0,
        };
        let mut dev: TestDevice = Device::new(
            beacon(),
            config,
            Peripherals {
                rtc: MockClock::new(1000),
                time_source: ScriptedTimeSource::new(&[]),
                delay: NoopDelay::default(),
                network: MockNetwork::connected(),
                indicator: RecordingIndicator::default(),
                keys: StaticKeys::new(&[], &[]),
            },
        );
        assert_eq!(dev.generate_tag(), Err(TagError::InvalidValidityWindow));

        let mut buf = [0u8; 8];
        dev.encoder = TagEncoder::default();
        assert_eq!(dev.generate_tag_into(&mut buf), Err(TagError::BufferTooSmall));
    }

    #[test]
    fn test_resynchronize() {
        let mut dev = device(
            beacon(),
            MockClock::new(0),
            &[None, None, Some(1_700_000_000), Some(1_700_000_005)],
            MockNetwork::connected(),
        );
        dev.start().unwrap();
        assert!(!dev.clock().is_synchronized());

        let outcome = dev.resynchronize().unwrap();
        assert!(matches!(outcome, Some(SyncOutcome::Synchronized(_))));
        assert_eq!(dev.device_time(TimeFormat::Unix).as_str(), "1700000005");
    }

    #[test]
    fn test_resynchronize_skipped_without_network() {
        let mut dev = device(beacon(), MockClock::new(10), &[], MockNetwork::refusing());
        dev.start().unwrap();
        assert_eq!(dev.resynchronize(), Ok(None));
    }

    #[test]
    fn test_report_status_renders_health_color() {
        let mut dev = device(beacon(), MockClock::new(0), &[], MockNetwork::connected());

        assert_eq!(dev.report_status(), IndicatorColor::Green);
        dev.set_health_status(HealthClassification::Positive);
        assert_eq!(dev.report_status(), IndicatorColor::Red);
        dev.set_health_status(HealthClassification::SystemFlag);
        dev.report_status();

        assert_eq!(
            dev.indicator.rendered,
            vec![Rgb::new(0, 255, 0), Rgb::new(255, 0, 0), Rgb::new(128, 0, 128)]
        );
    }

    #[test]
    fn test_report_status_tolerates_indicator_failure() {
        let mut dev = device(beacon(), MockClock::new(0), &[], MockNetwork::connected());
        dev.indicator.fail = true;
        assert_eq!(dev.report_status(), IndicatorColor::Green);
        assert!(dev.indicator.rendered.is_empty());
    }
}
