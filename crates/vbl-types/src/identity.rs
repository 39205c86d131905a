use std::fmt;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Opaque authenticated caller identity.
///
/// The engine never interprets principal bytes; they come from whatever
/// authentication layer fronts the ledger. Two principals denote the same
/// caller exactly when their bytes are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Principal([u8; 32]);

impl Principal {
    /// Create a principal from raw bytes.
    pub fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a random principal for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string (64 hex characters, optional `pr:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("pr:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("pr:{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.short_id())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

/// 96-bit store-instance identity.
///
/// Derived once at engine construction from the instance's own address and
/// the hash of the immediately preceding block, then embedded as the high
/// 12 bytes of every [`BlobId`] the instance mints. Instances constructed
/// from different addresses or blocks can never mint colliding blob ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId([u8; 12]);

impl InstanceId {
    /// Derive the instance identity for `address`, where `parent_hash` is
    /// the hash of the block immediately preceding construction.
    pub fn derive(address: &Principal, parent_hash: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"vbl-instance-v1:");
        hasher.update(address.as_bytes());
        hasher.update(parent_hash);
        let digest = hasher.finalize();

        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&digest.as_bytes()[..12]);
        Self(bytes)
    }

    /// Create from raw bytes. Use `derive()` for production code.
    pub fn from_raw(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// The raw 12 bytes.
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("in:{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.short_id())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

/// 256-bit globally unique blob identifier.
///
/// Layout: the high 96 bits are the minting instance's [`InstanceId`]; the
/// low 160 bits are derived from the creator and a creator-chosen nonce.
/// The same (instance, caller, nonce) triple always yields the same id, and
/// ids from distinct instances differ in their high bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobId([u8; 32]);

impl BlobId {
    /// Mint the id for (`caller`, `nonce`) under the given instance identity.
    pub fn mint(instance: &InstanceId, caller: &Principal, nonce: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"vbl-blob-v1:");
        hasher.update(caller.as_bytes());
        hasher.update(&nonce.to_le_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 32];
        bytes[..12].copy_from_slice(instance.as_bytes());
        bytes[12..].copy_from_slice(&digest.as_bytes()[..20]);
        Self(bytes)
    }

    /// The minting instance's identity (high 96 bits).
    pub fn instance(&self) -> InstanceId {
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&self.0[..12]);
        InstanceId::from_raw(bytes)
    }

    /// The id as a 256-bit word (big-endian byte interpretation).
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Create from raw bytes. Use `mint()` for production code.
    pub fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string (64 hex characters, optional `blob:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("blob:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("blob:{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobId({})", self.short_id())
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}
