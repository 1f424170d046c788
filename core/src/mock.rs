//! Host test doubles for the shield-hal collaborators

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use embedded_io::ErrorKind;
use shield_hal::{
    DatagramSocket, DateTime, HardwareClock, Indicator, KeyProvider, Network, Rgb, TimeSource,
};

use crate::calendar::datetime_to_unix;

/// RTC that holds whatever was last written and does not tick
#[derive(Debug, Default)]
pub struct MockClock {
    epoch: u64,
    absent_probes: u32,
    probes: u32,
    writes: u32,
    fail_reads: bool,
    fail_writes: bool,
}

impl MockClock {
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            ..Self::default()
        }
    }

    /// Report absent for the first `probes` presence checks
    pub fn absent_for(probes: u32, epoch: u64) -> Self {
        Self {
            epoch,
            absent_probes: probes,
            ..Self::default()
        }
    }

    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn probes(&self) -> u32 {
        self.probes
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl HardwareClock for MockClock {
    type Error = ();

    fn is_present(&mut self) -> bool {
        self.probes += 1;
        self.probes > self.absent_probes
    }

    fn read(&mut self) -> Result<u64, ()> {
        if self.fail_reads {
            return Err(());
        }
        Ok(self.epoch)
    }

    fn write(&mut self, datetime: &DateTime) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.epoch = datetime_to_unix(datetime);
        self.writes += 1;
        Ok(())
    }
}

/// Time source that replays a fixed script, then fails
#[derive(Debug, Default)]
pub struct ScriptedTimeSource {
    script: VecDeque<Option<u64>>,
    calls: usize,
}

impl ScriptedTimeSource {
    pub fn new(script: &[Option<u64>]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            calls: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl TimeSource for ScriptedTimeSource {
    fn fetch_epoch(&mut self) -> Option<u64> {
        self.calls += 1;
        self.script.pop_front().flatten()
    }
}

/// Delay that returns immediately and remembers how long it was asked to wait
#[derive(Debug, Default)]
pub struct NoopDelay {
    elapsed_ns: u64,
}

impl NoopDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ns += ms as u64 * 1_000_000;
    }
}

/// Network link that comes up on connect unless told to refuse
#[derive(Debug, Default)]
pub struct MockNetwork {
    connected: bool,
    refuse: bool,
    pub joined: Option<(String, String)>,
}

impl MockNetwork {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }
}

impl Network for MockNetwork {
    type Error = ();

    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), ()> {
        self.joined = Some((ssid.to_string(), password.to_string()));
        if self.refuse {
            return Err(());
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Indicator that records every color it rendered
#[derive(Debug, Default)]
pub struct RecordingIndicator {
    latched: Option<Rgb>,
    pub rendered: Vec<Rgb>,
    pub fail: bool,
}

impl Indicator for RecordingIndicator {
    type Error = ();

    fn set_color(&mut self, color: Rgb) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.latched = Some(color);
        Ok(())
    }

    fn render(&mut self) -> Result<(), ()> {
        match self.latched {
            Some(color) if !self.fail => {
                self.rendered.push(color);
                Ok(())
            }
            _ => Err(()),
        }
    }
}

/// Key provider backed by fixed byte slices
#[derive(Debug, Clone)]
pub struct StaticKeys {
    pub iv: Vec<u8>,
    pub key: Vec<u8>,
}

impl StaticKeys {
    pub fn new(iv: &[u8], key: &[u8]) -> Self {
        Self {
            iv: iv.to_vec(),
            key: key.to_vec(),
        }
    }
}

impl KeyProvider for StaticKeys {
    fn current_iv(&self) -> &[u8] {
        &self.iv
    }

    fn current_key_material(&self) -> &[u8] {
        &self.key
    }
}

/// Socket failure carrying an `embedded-io` error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketError(pub ErrorKind);

impl core::fmt::Display for SocketError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "socket error: {:?}", self.0)
    }
}

impl std::error::Error for SocketError {}

impl embedded_io::Error for SocketError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Socket that records requests and answers from a queue of datagrams
#[derive(Debug, Default)]
pub struct ScriptedSocket {
    replies: VecDeque<Result<Vec<u8>, SocketError>>,
    pub sent: Vec<Vec<u8>>,
}

impl ScriptedSocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, datagram: &[u8]) -> Self {
        self.replies.push_back(Ok(datagram.to_vec()));
        self
    }

    pub fn fail(mut self, kind: ErrorKind) -> Self {
        self.replies.push_back(Err(SocketError(kind)));
        self
    }
}

impl embedded_io::ErrorType for ScriptedSocket {
    type Error = SocketError;
}

impl DatagramSocket for ScriptedSocket {
    fn send(&mut self, datagram: &[u8]) -> Result<(), SocketError> {
        self.sent.push(datagram.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, SocketError> {
        match self.replies.pop_front() {
            Some(Ok(datagram)) => {
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok(len)
            }
            Some(Err(e)) => Err(e),
            None => Err(SocketError(ErrorKind::TimedOut)),
        }
    }
}
