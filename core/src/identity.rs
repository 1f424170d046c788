//! Device identity: role, hardware address and contact number
//!
//! Provisioned once per unit and never mutated afterwards.

use core::fmt::Write;

use heapless::String;

use crate::error::IdentityError;

/// Maximum length of a hardware address string
/// `AA:BB:CC:DD:EE:FF` is 17 chars; longer chip UIDs (24 hex chars) also fit
pub const HARDWARE_ADDRESS_MAX_LEN: usize = 32;

/// Maximum length of a contact number
pub const CONTACT_NUMBER_MAX_LEN: usize = 20;

pub type HardwareAddress = String<HARDWARE_ADDRESS_MAX_LEN>;
pub type ContactNumber = String<CONTACT_NUMBER_MAX_LEN>;

/// Device role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Stationary unit broadcasting presence and a time reference
    Beacon,
    /// Mobile unit logging contact events on behalf of a person
    Neuron,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Beacon => "Beacon",
            Role::Neuron => "Neuron",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-unit identity
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceIdentity {
    role: Role,
    hardware_address: HardwareAddress,
    contact_number: Option<ContactNumber>,
}

impl DeviceIdentity {
    pub fn new(
        role: Role,
        hardware_address: &str,
        contact_number: Option<&str>,
    ) -> Result<Self, IdentityError> {
        let hardware_address = bounded::<HARDWARE_ADDRESS_MAX_LEN>(hardware_address)?;
        let contact_number = contact_number
            .map(bounded::<CONTACT_NUMBER_MAX_LEN>)
            .transpose()?;
        Ok(Self {
            role,
            hardware_address,
            contact_number,
        })
    }

    /// Beacon identity; beacons carry no contact number
    pub fn beacon(hardware_address: &str) -> Result<Self, IdentityError> {
        Self::new(Role::Beacon, hardware_address, None)
    }

    pub fn neuron(hardware_address: &str, contact_number: &str) -> Result<Self, IdentityError> {
        Self::new(Role::Neuron, hardware_address, Some(contact_number))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn hardware_address(&self) -> &str {
        &self.hardware_address
    }

    pub fn contact_number(&self) -> Option<&str> {
        self.contact_number.as_deref()
    }
}

fn bounded<const N: usize>(s: &str) -> Result<String<N>, IdentityError> {
    let mut out = String::new();
    out.push_str(s).map_err(|_| IdentityError::FieldTooLong)?;
    Ok(out)
}

/// Render a MAC address as `AA:BB:CC:DD:EE:FF`
pub fn format_mac(mac: &[u8; 6]) -> HardwareAddress {
    let mut out = HardwareAddress::new();
    for (i, byte) in mac.iter().enumerate() {
        // 17 chars always fit in HARDWARE_ADDRESS_MAX_LEN
        if i > 0 {
            let _ = out.push(':');
        }
        let _ = write!(out, "{:02X}", byte);
    }
    out
}
