//! Cryptographic primitives for Supernet validators
//!
//! This crate provides:
//! - BLS12-381 validator public keys (min_pk)
//! - The four-limb `uint256[4]` encoding used by the registration contract

#![deny(clippy::unwrap_used)]

pub mod bls;
pub mod error;

pub use bls::{
    BlsKeyPair, BlsPublicKey, BlsSecretKey, PUBLIC_KEY_COMPRESSED_SIZE, PUBLIC_KEY_LIMBS,
    PUBLIC_KEY_UNCOMPRESSED_SIZE,
};
pub use error::BlsError;
