//! Tag protocol: health/contact payload exchanged between devices
//!
//! ## Wire format
//! A compact JSON object, fields in this order:
//!
//! | Field | Type    | Content                                   |
//! |-------|---------|-------------------------------------------|
//! | `HS`  | string  | health classification (`Healthy`, ...)    |
//! | `CV`  | integer | schema version ([`SCHEMA_VERSION`])       |
//! | `MA`  | string  | device hardware address                   |
//! | `CN`  | string  | contact number (empty for beacons)        |
//! | `CT`  | string  | creation time, decimal Unix seconds       |
//! | `ET`  | string  | expiry time, decimal Unix seconds         |
//! | `IV`  | string  | initialization vector, lowercase hex      |
//! | `IK`  | string  | key material, lowercase hex               |
//!
//! Receivers ignore unknown fields and reject unknown `CV` values.

use serde::{Deserialize, Serialize};
use shield_hal::KeyProvider;

use crate::config::TagConfig;
use crate::error::TagError;
use crate::health::HealthClassification;
use crate::identity::{ContactNumber, DeviceIdentity, HardwareAddress};

/// Field set version carried in `CV`
pub const SCHEMA_VERSION: u32 = 1;

/// Capacity of an owned serialized payload
pub const TAG_PAYLOAD_CAPACITY: usize = 384;

/// Longest IV or key accepted from the key provider, in bytes
pub const KEY_MATERIAL_MAX_LEN: usize = 32;

const KEY_HEX_LEN: usize = KEY_MATERIAL_MAX_LEN * 2;

pub type KeyHex = heapless::String<KEY_HEX_LEN>;
pub type TagPayload = heapless::String<TAG_PAYLOAD_CAPACITY>;

/// Structured tag record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tag {
    #[serde(rename = "HS")]
    health_status: HealthClassification,
    #[serde(rename = "CV")]
    schema_version: u32,
    #[serde(rename = "MA")]
    device_address: HardwareAddress,
    #[serde(rename = "CN")]
    contact_number: ContactNumber,
    #[serde(rename = "CT", with = "epoch_string")]
    creation_timestamp: u64,
    #[serde(rename = "ET", with = "epoch_string")]
    expiry_timestamp: u64,
    #[serde(rename = "IV")]
    crypto_iv: KeyHex,
    #[serde(rename = "IK")]
    crypto_key_material: KeyHex,
}

impl Tag {
    pub fn health_status(&self) -> HealthClassification {
        self.health_status
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn device_address(&self) -> &str {
        &self.device_address
    }

    pub fn contact_number(&self) -> &str {
        &self.contact_number
    }

    pub fn creation_timestamp(&self) -> u64 {
        self.creation_timestamp
    }

    pub fn expiry_timestamp(&self) -> u64 {
        self.expiry_timestamp
    }

    pub fn crypto_iv(&self) -> &str {
        &self.crypto_iv
    }

    pub fn crypto_key_material(&self) -> &str {
        &self.crypto_key_material
    }

    /// Serialize into `buf`, returning the payload length
    pub fn write_to(&self, buf: &mut [u8]) -> Result<usize, TagError> {
        serde_json_core::to_slice(self, buf).map_err(ser_error)
    }

    /// Serialize into an owned payload
    pub fn to_payload(&self) -> Result<TagPayload, TagError> {
        serde_json_core::to_string(self).map_err(ser_error)
    }

    /// Parse and validate a received payload
    pub fn decode(bytes: &[u8]) -> Result<Tag, TagError> {
        #[derive(Deserialize)]
        struct VersionProbe {
            #[serde(rename = "CV")]
            schema_version: u32,
        }

        let (probe, _) =
            serde_json_core::from_slice::<VersionProbe>(bytes).map_err(|_| TagError::Malformed)?;
        if probe.schema_version != SCHEMA_VERSION {
            return Err(TagError::UnsupportedSchema(probe.schema_version));
        }

        // Every string field fits the hex key capacity once unescaped
        let mut scratch = [0u8; KEY_HEX_LEN];
        let (tag, _) = serde_json_core::from_slice_escaped::<Tag>(bytes, &mut scratch)
            .map_err(|_| TagError::Malformed)?;
        if tag.expiry_timestamp <= tag.creation_timestamp {
            return Err(TagError::InvalidValidityWindow);
        }
        Ok(tag)
    }
}

/// A tag together with its serialized payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTag {
    tag: Tag,
    payload: TagPayload,
}

impl EncodedTag {
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    pub fn into_parts(self) -> (Tag, TagPayload) {
        (self.tag, self.payload)
    }
}

/// Builds tags from identity, health and the current time
///
/// Holds configuration only; key material comes from the caller's
/// [`KeyProvider`] on every call.
#[derive(Debug, Clone)]
pub struct TagEncoder {
    validity_window_secs: u64,
}

impl TagEncoder {
    pub fn new(config: &TagConfig) -> Self {
        Self {
            validity_window_secs: config.validity_window_secs,
        }
    }

    pub fn validity_window_secs(&self) -> u64 {
        self.validity_window_secs
    }

    /// Assemble the structured record
    pub fn build<K: KeyProvider>(
        &self,
        identity: &DeviceIdentity,
        health: HealthClassification,
        now_epoch: u64,
        keys: &K,
    ) -> Result<Tag, TagError> {
        if self.validity_window_secs == 0 {
            return Err(TagError::InvalidValidityWindow);
        }
        let expiry_timestamp = now_epoch
            .checked_add(self.validity_window_secs)
            .ok_or(TagError::InvalidValidityWindow)?;

        Ok(Tag {
            health_status: health,
            schema_version: SCHEMA_VERSION,
            device_address: text(identity.hardware_address())?,
            contact_number: text(identity.contact_number().unwrap_or(""))?,
            creation_timestamp: now_epoch,
            expiry_timestamp,
            crypto_iv: key_hex(keys.current_iv())?,
            crypto_key_material: key_hex(keys.current_key_material())?,
        })
    }

    /// Build and serialize into an owned payload
    pub fn encode<K: KeyProvider>(
        &self,
        identity: &DeviceIdentity,
        health: HealthClassification,
        now_epoch: u64,
        keys: &K,
    ) -> Result<EncodedTag, TagError> {
        let tag = self.build(identity, health, now_epoch, keys)?;
        let payload = tag.to_payload()?;
        Ok(EncodedTag { tag, payload })
    }

    /// Build and serialize into a caller buffer, returning the payload length
    ///
    /// On [`TagError::BufferTooSmall`] the caller may retry with a larger buffer.
    pub fn encode_into<K: KeyProvider>(
        &self,
        identity: &DeviceIdentity,
        health: HealthClassification,
        now_epoch: u64,
        keys: &K,
        buf: &mut [u8],
    ) -> Result<usize, TagError> {
        self.build(identity, health, now_epoch, keys)?.write_to(buf)
    }
}

impl Default for TagEncoder {
    fn default() -> Self {
        Self::new(&TagConfig::default())
    }
}

fn ser_error(e: serde_json_core::ser::Error) -> TagError {
    match e {
        serde_json_core::ser::Error::BufferFull => TagError::BufferTooSmall,
        _ => TagError::Serialization,
    }
}

fn text<const N: usize>(s: &str) -> Result<heapless::String<N>, TagError> {
    let mut out = heapless::String::new();
    out.push_str(s).map_err(|_| TagError::FieldTooLong)?;
    Ok(out)
}

fn key_hex(bytes: &[u8]) -> Result<KeyHex, TagError> {
    if bytes.len() > KEY_MATERIAL_MAX_LEN {
        return Err(TagError::KeyMaterialTooLong);
    }
    let mut buf = [0u8; KEY_HEX_LEN];
    let out = &mut buf[..bytes.len() * 2];
    hex::encode_to_slice(bytes, out).map_err(|_| TagError::Serialization)?;
    let encoded = core::str::from_utf8(out).map_err(|_| TagError::Serialization)?;
    text(encoded)
}

/// Unix seconds carried as decimal strings
mod epoch_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::calendar::{format_unix, TIME_STRING_LEN};

    pub fn serialize<S: Serializer>(epoch: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_unix(*epoch))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s: heapless::String<TIME_STRING_LEN> = Deserialize::deserialize(deserializer)?;
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(D::Error::custom("invalid epoch"));
        }
        s.parse().map_err(|_| D::Error::custom("invalid epoch"))
    }
}
