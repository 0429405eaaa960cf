//! BLS12-381 validator keys
//!
//! This module provides BLS12-381 keys with:
//! - min_pk variant (48-byte compressed G1 public keys)
//! - the four-limb contract encoding used by the supernet manager contract
//!
//! # Four-limb encoding
//!
//! The registration contract stores a public key as `uint256[4]`. The four
//! limbs, concatenated big-endian, are the 128-byte EIP-2537 encoding of the
//! G1 point: `x` and `y` each occupy 64 bytes, of which the leading 16 bytes
//! are zero padding.

use crate::error::BlsError;
use alloy_primitives::U256;
use blst::min_pk::{PublicKey as BlstPubKey, SecretKey as BlstSecKey};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// Size of a compressed public key.
pub const PUBLIC_KEY_COMPRESSED_SIZE: usize = 48;

/// Size of an uncompressed public key (x || y).
pub const PUBLIC_KEY_UNCOMPRESSED_SIZE: usize = 96;

/// Size of one field element in the EIP-2537 encoding.
const FP_ENCODED_SIZE: usize = 64;

/// Zero padding in front of each 48-byte field element.
const FP_PADDING: usize = FP_ENCODED_SIZE - PUBLIC_KEY_COMPRESSED_SIZE;

/// Number of `uint256` limbs in the contract encoding.
pub const PUBLIC_KEY_LIMBS: usize = 4;

/// BLS12-381 secret key (32 bytes)
#[derive(Clone)]
pub struct BlsSecretKey(BlstSecKey);

impl BlsSecretKey {
    /// Generate a new random secret key
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut ikm = [0u8; 32];
        rng.fill_bytes(&mut ikm);
        let sk = BlstSecKey::key_gen(&ikm, &[]).expect("ikm is 32 bytes");
        Self(sk)
    }

    /// Load from raw bytes (32 bytes scalar)
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, BlsError> {
        BlstSecKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| BlsError::InvalidSecretKey)
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Get the corresponding public key
    pub fn public_key(&self) -> BlsPublicKey {
        BlsPublicKey(self.0.sk_to_pk())
    }
}

impl std::fmt::Debug for BlsSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlsSecretKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// BLS12-381 public key (48 bytes compressed)
#[derive(Clone, PartialEq, Eq)]
pub struct BlsPublicKey(BlstPubKey);

impl BlsPublicKey {
    /// Load from bytes (48 bytes compressed)
    ///
    /// The key is checked to be on the curve, in the subgroup and not the
    /// point at infinity.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_COMPRESSED_SIZE]) -> Result<Self, BlsError> {
        BlstPubKey::key_validate(bytes)
            .map(Self)
            .map_err(|_| BlsError::InvalidPublicKey)
    }

    /// Serialize to bytes (48 bytes compressed)
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_COMPRESSED_SIZE] {
        self.0.to_bytes()
    }

    /// Decode the four-limb contract encoding.
    ///
    /// Only the EIP-2537 BLS12-381 G1 layout is accepted. Keys registered as
    /// BN254 G2 points, as `CustomSupernetManager` deployments store them,
    /// are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`BlsError::InvalidLimbPadding`] if the padding bytes of either
    /// coordinate are non-zero and [`BlsError::InvalidPublicKey`] if the
    /// coordinates do not describe a valid, non-identity subgroup point.
    pub fn from_big_int_limbs(limbs: &[U256; PUBLIC_KEY_LIMBS]) -> Result<Self, BlsError> {
        let mut encoded = [0u8; PUBLIC_KEY_LIMBS * 32];
        for (chunk, limb) in encoded.chunks_exact_mut(32).zip(limbs.iter()) {
            chunk.copy_from_slice(&limb.to_be_bytes::<32>());
        }

        let (x, y) = encoded.split_at(FP_ENCODED_SIZE);
        if x[..FP_PADDING].iter().any(|b| *b != 0) || y[..FP_PADDING].iter().any(|b| *b != 0) {
            return Err(BlsError::InvalidLimbPadding);
        }

        let mut uncompressed = [0u8; PUBLIC_KEY_UNCOMPRESSED_SIZE];
        uncompressed[..PUBLIC_KEY_COMPRESSED_SIZE].copy_from_slice(&x[FP_PADDING..]);
        uncompressed[PUBLIC_KEY_COMPRESSED_SIZE..].copy_from_slice(&y[FP_PADDING..]);

        BlstPubKey::key_validate(&uncompressed)
            .map(Self)
            .map_err(|_| BlsError::InvalidPublicKey)
    }

    /// Encode as the four-limb contract representation.
    pub fn to_big_int_limbs(&self) -> [U256; PUBLIC_KEY_LIMBS] {
        let uncompressed = self.0.serialize();

        let mut encoded = [0u8; PUBLIC_KEY_LIMBS * 32];
        encoded[FP_PADDING..FP_ENCODED_SIZE]
            .copy_from_slice(&uncompressed[..PUBLIC_KEY_COMPRESSED_SIZE]);
        encoded[FP_ENCODED_SIZE + FP_PADDING..]
            .copy_from_slice(&uncompressed[PUBLIC_KEY_COMPRESSED_SIZE..]);

        let mut limbs = [U256::ZERO; PUBLIC_KEY_LIMBS];
        for (limb, chunk) in limbs.iter_mut().zip(encoded.chunks_exact(32)) {
            *limb = U256::from_be_slice(chunk);
        }
        limbs
    }
}

impl std::fmt::Debug for BlsPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "BlsPublicKey({})", hex::encode(&bytes[..8]))
    }
}

impl Serialize for BlsPublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;

        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(self.to_bytes()))
        } else {
            // Use serialize_tuple to match deserialize_tuple (no length prefix)
            let bytes = self.to_bytes();
            let mut tuple = serializer.serialize_tuple(PUBLIC_KEY_COMPRESSED_SIZE)?;
            for byte in bytes {
                tuple.serialize_element(&byte)?;
            }
            tuple.end()
        }
    }
}

impl<'de> Deserialize<'de> for BlsPublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{SeqAccess, Visitor};

        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
            let arr: [u8; PUBLIC_KEY_COMPRESSED_SIZE] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| serde::de::Error::custom("invalid public key length"))?;
            Self::from_bytes(&arr).map_err(serde::de::Error::custom)
        } else {
            struct ArrayVisitor;

            impl<'de> Visitor<'de> for ArrayVisitor {
                type Value = [u8; PUBLIC_KEY_COMPRESSED_SIZE];

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("48 bytes")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    let mut arr = [0u8; PUBLIC_KEY_COMPRESSED_SIZE];
                    for (i, byte) in arr.iter_mut().enumerate() {
                        *byte = seq
                            .next_element()?
                            .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                    }
                    Ok(arr)
                }
            }

            let arr = deserializer.deserialize_tuple(PUBLIC_KEY_COMPRESSED_SIZE, ArrayVisitor)?;
            Self::from_bytes(&arr).map_err(serde::de::Error::custom)
        }
    }
}

/// BLS key pair (convenience wrapper)
#[derive(Clone)]
pub struct BlsKeyPair {
    /// Secret half.
    pub secret_key: BlsSecretKey,
    /// Public half.
    pub public_key: BlsPublicKey,
}

impl BlsKeyPair {
    /// Generate a new random key pair
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self::from_secret_key(BlsSecretKey::generate(rng))
    }

    /// Create from secret key
    pub fn from_secret_key(secret_key: BlsSecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }
}

impl std::fmt::Debug for BlsKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlsKeyPair")
            .field("public_key", &self.public_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn keypair(seed: u64) -> BlsKeyPair {
        BlsKeyPair::generate(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_key_generation() {
        let keypair = BlsKeyPair::generate(&mut rand::thread_rng());
        let bytes = keypair.public_key.to_bytes();
        let restored = BlsPublicKey::from_bytes(&bytes).unwrap();
        assert_eq!(keypair.public_key, restored);
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        assert_eq!(keypair(9).public_key, keypair(9).public_key);
        assert_ne!(keypair(9).public_key, keypair(10).public_key);
    }

    #[test]
    fn test_secret_key_bytes_roundtrip() {
        let keypair = keypair(1);
        let restored = BlsSecretKey::from_bytes(&keypair.secret_key.to_bytes()).unwrap();
        assert_eq!(restored.public_key(), keypair.public_key);
    }

    #[test]
    fn test_big_int_limbs_roundtrip() {
        let keypair = keypair(2);
        let limbs = keypair.public_key.to_big_int_limbs();

        // x and y are each left padded with 16 zero bytes
        assert!(limbs[0] < (U256::from(1u8) << 128));
        assert!(limbs[2] < (U256::from(1u8) << 128));

        let restored = BlsPublicKey::from_big_int_limbs(&limbs).unwrap();
        assert_eq!(restored, keypair.public_key);
    }

    #[test]
    fn test_big_int_limbs_rejects_padding() {
        let mut limbs = keypair(3).public_key.to_big_int_limbs();
        limbs[0] |= U256::from(1u8) << 200;

        assert_eq!(
            BlsPublicKey::from_big_int_limbs(&limbs),
            Err(BlsError::InvalidLimbPadding)
        );
    }

    #[test]
    fn test_big_int_limbs_rejects_invalid_point() {
        let zero = [U256::ZERO; PUBLIC_KEY_LIMBS];
        assert!(BlsPublicKey::from_big_int_limbs(&zero).is_err());

        let not_on_curve = [U256::ZERO, U256::from(1u8), U256::ZERO, U256::from(1u8)];
        assert_eq!(
            BlsPublicKey::from_big_int_limbs(&not_on_curve),
            Err(BlsError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_pubkey_bincode_roundtrip() {
        let keypair = keypair(4);

        let encoded = bincode::serialize(&keypair.public_key).unwrap();
        assert_eq!(encoded.len(), PUBLIC_KEY_COMPRESSED_SIZE);
        let decoded: BlsPublicKey = bincode::deserialize(&encoded).unwrap();

        assert_eq!(keypair.public_key, decoded);
    }

    #[test]
    fn test_pubkey_json_roundtrip() {
        let keypair = keypair(5);

        let json = serde_json::to_string(&keypair.public_key).unwrap();
        let decoded: BlsPublicKey = serde_json::from_str(&json).unwrap();

        assert_eq!(keypair.public_key, decoded);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", keypair(6).secret_key);
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_big_int_limbs_rejects_bn254_g2_key() {
        // BN254 G2 generator as (x.c0, x.c1, y.c0, y.c1)
        let limbs: [U256; PUBLIC_KEY_LIMBS] = [
            "10857046999023057135944570762232829481370756359578518086990519993285655852781",
            "11559732032986387107991004021392285783925812861821192530917403151452391805634",
            "8495653923123431417604973247489272438418190587263600148770280649306958101930",
            "4082367875863433681332203403145435568316851327593401208105741076214120093531",
        ]
        .map(|limb| limb.parse().unwrap());

        assert_eq!(
            BlsPublicKey::from_big_int_limbs(&limbs),
            Err(BlsError::InvalidLimbPadding)
        );
    }
}
