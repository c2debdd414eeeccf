//! Key management and encrypted values
//!
//! A passphrase unlocks a [`ControlKey`], which unwraps the [`DataKey`]s
//! that encrypt item fields. [`ControlData`] names the control key new
//! data is encrypted under. Unlocked keys are held in a [`KeyRing`].

pub mod control_data;
pub mod control_key;
pub mod data_key;
pub mod encrypted;
pub mod key_ring;

pub use control_data::ControlData;
pub use control_key::ControlKey;
pub use data_key::DataKey;
pub use encrypted::{EncryptedField, EncryptedValues};
pub use key_ring::KeyRing;
