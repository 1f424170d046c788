//! Key-management collaborator
//!
//! Secrets are provisioned and rotated outside the firmware image. The core
//! only copies whatever the provider currently hands out.

pub trait KeyProvider {
    /// Initialization vector currently in use
    fn current_iv(&self) -> &[u8];

    /// Key material currently in use
    fn current_key_material(&self) -> &[u8];
}
