//! Network collaborators

use embedded_io::ErrorType;

/// Link-level connectivity (Wi-Fi association or equivalent)
pub trait Network {
    type Error: core::fmt::Debug;

    /// Associate with the given network, blocking until associated or failed
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error>;

    /// Whether the link is currently up
    fn is_connected(&self) -> bool;
}

/// Connected datagram socket (UDP)
///
/// The peer endpoint is fixed when the socket is created; DNS resolution and
/// binding happen in the board's network stack.
pub trait DatagramSocket: ErrorType {
    /// Send one datagram to the peer
    fn send(&mut self, datagram: &[u8]) -> Result<(), Self::Error>;

    /// Receive one datagram from the peer, returning its length
    ///
    /// Implementations apply their own receive timeout and report it as an
    /// error of kind `TimedOut`.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}
