//! SNTP client over a connected datagram socket
//!
//! Implements the client side of SNTP (RFC 4330 / RFC 5905) as a
//! [`TimeSource`]: one request, one response, no internal retries.
//!
//! - 48-byte request with LI=0, VN=3, Mode=3 (client)
//! - Response must be at least 48 bytes with Mode=4 (server)
//! - Stratum validation (rejects 0 and anything above `max_stratum`)
//! - Transmit timestamp (bytes 40-47) converted from the NTP era to Unix time

use embedded_io::ErrorKind;
use shield_hal::{DatagramSocket, TimeSource};

use crate::config::SntpConfig;
use crate::error::SntpError;

/// NTP epoch offset (1900-01-01 to 1970-01-01 in seconds)
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// SNTP packet length
const NTP_PACKET_LEN: usize = 48;

/// LI=0, VN=3, Mode=3
const NTP_CLIENT_HEADER: u8 = 0x1B;

const NTP_MODE_SERVER: u8 = 4;

/// Timestamp with microsecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp {
    /// Unix timestamp in seconds since epoch (1970-01-01 00:00:00 UTC)
    pub unix_secs: u64,
    /// Microseconds component (0-999,999)
    pub micros: u32,
}

impl Timestamp {
    pub const fn new(unix_secs: u64, micros: u32) -> Self {
        Self { unix_secs, micros }
    }

    /// Convert from NTP timestamp (seconds since 1900-01-01)
    pub fn from_ntp(ntp_secs: u64, ntp_frac: u32) -> Self {
        let unix_secs = ntp_secs.saturating_sub(NTP_UNIX_OFFSET);
        // NTP fraction is in units of 2^-32 seconds
        let micros = ((ntp_frac as u64 * 1_000_000) >> 32) as u32;
        Self::new(unix_secs, micros)
    }
}

/// Network time source speaking SNTP
pub struct SntpTimeSource<S> {
    socket: S,
    config: SntpConfig,
}

impl<S: DatagramSocket> SntpTimeSource<S> {
    pub fn new(socket: S, config: SntpConfig) -> Self {
        Self { socket, config }
    }

    /// Send one SNTP request and parse the response
    pub fn query(&mut self) -> Result<Timestamp, SntpError> {
        let mut request = [0u8; NTP_PACKET_LEN];
        request[0] = NTP_CLIENT_HEADER;

        self.socket.send(&request).map_err(socket_error)?;

        let mut response = [0u8; NTP_PACKET_LEN];
        let len = self.socket.receive(&mut response).map_err(socket_error)?;
        parse_response(&response[..len], self.config.max_stratum)
    }

    pub fn into_socket(self) -> S {
        self.socket
    }
}

impl<S: DatagramSocket> TimeSource for SntpTimeSource<S> {
    fn fetch_epoch(&mut self) -> Option<u64> {
        match self.query() {
            Ok(ts) => {
                debug!("NTP timestamp: {}s {}us UTC", ts.unix_secs, ts.micros);
                Some(ts.unix_secs)
            }
            Err(e) => {
                warn!("SNTP request failed: {:?}", e);
                None
            }
        }
    }
}

fn socket_error<E: embedded_io::Error>(e: E) -> SntpError {
    match e.kind() {
        ErrorKind::TimedOut => SntpError::Timeout,
        _ => SntpError::Network,
    }
}

/// Validate an SNTP server response and extract its transmit timestamp
pub fn parse_response(response: &[u8], max_stratum: u8) -> Result<Timestamp, SntpError> {
    if response.len() < NTP_PACKET_LEN {
        return Err(SntpError::InvalidResponse);
    }

    if response[0] & 0x07 != NTP_MODE_SERVER {
        return Err(SntpError::InvalidResponse);
    }

    let stratum = response[1];
    if stratum == 0 || stratum > max_stratum {
        return Err(SntpError::InvalidStratum);
    }

    let tx_secs =
        u32::from_be_bytes([response[40], response[41], response[42], response[43]]) as u64;
    let tx_frac = u32::from_be_bytes([response[44], response[45], response[46], response[47]]);

    if tx_secs == 0 && tx_frac == 0 {
        return Err(SntpError::ZeroTimestamp);
    }

    Ok(Timestamp::from_ntp(tx_secs, tx_frac))
}
