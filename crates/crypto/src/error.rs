//! Cryptographic error types

use thiserror::Error;

/// BLS12-381 key errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlsError {
    /// Invalid secret key bytes
    #[error("invalid secret key bytes")]
    InvalidSecretKey,

    /// Invalid public key bytes or point
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Non-zero padding in the four-limb key encoding
    #[error("invalid public key limb padding")]
    InvalidLimbPadding,
}
