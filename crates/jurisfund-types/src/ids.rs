//! Identifiers used throughout JurisFund.
//!
//! Parties, escrow units, the shared escrow implementation and the registry
//! are all addressed by a 20-byte [`AccountId`]. Escrow addresses are derived
//! from a caller-chosen [`Salt`]; stakes are keyed by a [`StakeKey`] hashed
//! from the staker and a pool nonce. Journaled events carry a UUIDv7
//! [`EventId`] for time-ordered sorting.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{JurisError, Result};

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Opaque 20-byte identity of a party, escrow unit, implementation or registry.
///
/// The core never authenticates an `AccountId`; role checks are plain
/// equality against stored fields. Serialized as a `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// The all-zero identity. Never a valid role holder.
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Stable identity derived from a human-readable label.
    ///
    /// Used for well-known protocol identities (registry, implementation)
    /// and for named fixtures in tests.
    #[must_use]
    pub fn derive(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"jurisfund:account:v1:");
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[..20]);
        Self(bytes)
    }

    /// Parse a `0x`-prefixed (or bare) 40-character hex string.
    ///
    /// # Errors
    /// Returns [`JurisError::InvalidArgument`] on malformed input.
    pub fn from_hex(s: &str) -> Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(raw).map_err(|e| JurisError::InvalidArgument {
            reason: format!("account id {s}: {e}"),
        })?;
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|_| JurisError::InvalidArgument {
                reason: format!("account id {s} is not 20 bytes"),
            })?;
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for AccountId {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// Random identities for unit tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AccountId {
    pub fn random() -> Self {
        Self(rand::random::<[u8; 20]>())
    }
}

// ---------------------------------------------------------------------------
// Salt
// ---------------------------------------------------------------------------

/// Caller-chosen 32-byte salt that fixes an escrow's address before deployment.
/// Serialized as a `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Salt(pub [u8; 32]);

impl Salt {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a `0x`-prefixed (or bare) 64-character hex string.
    ///
    /// # Errors
    /// Returns [`JurisError::InvalidArgument`] on malformed input.
    pub fn from_hex(s: &str) -> Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(raw).map_err(|e| JurisError::InvalidArgument {
            reason: format!("salt {s}: {e}"),
        })?;
        let bytes: [u8; 32] = decoded
            .try_into()
            .map_err(|_| JurisError::InvalidArgument {
                reason: format!("salt {s} is not 32 bytes"),
            })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Salt {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// StakeKey
// ---------------------------------------------------------------------------

/// Key of a single stake position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct StakeKey(pub [u8; 32]);

impl StakeKey {
    /// Deterministic key from the staker, the pool nonce and the stake time.
    ///
    /// The pool nonce never repeats, so keys are unique even for several
    /// stakes by one owner within the same second.
    #[must_use]
    pub fn derive(owner: AccountId, nonce: u64, at: DateTime<Utc>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"jurisfund:stake:v1:");
        hasher.update(owner.as_bytes());
        hasher.update(nonce.to_le_bytes());
        hasher.update(at.timestamp().to_le_bytes());
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for StakeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stake:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// EventId
// ---------------------------------------------------------------------------

/// Unique identifier of a journaled event. UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn derived_accounts_are_stable() {
        assert_eq!(AccountId::derive("safe"), AccountId::derive("safe"));
        assert_ne!(AccountId::derive("safe"), AccountId::derive("lawyer"));
    }

    #[test]
    fn account_hex_roundtrip() {
        let id = AccountId::derive("plaintiff");
        let parsed = AccountId::from_hex(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn account_hex_wrong_length_rejected() {
        let err = AccountId::from_hex("0xdeadbeef").unwrap_err();
        assert!(matches!(err, JurisError::InvalidArgument { .. }));
    }

    #[test]
    fn zero_account() {
        assert!(AccountId::ZERO.is_zero());
        assert!(!AccountId::random().is_zero());
    }

    #[test]
    fn salt_from_hex() {
        let salt =
            Salt::from_hex("0xef50095700000000000000000000000000000000000000000000000000000000")
                .unwrap();
        assert_eq!(salt.0[0], 0xef);
        assert_eq!(salt.0[3], 0x57);
        assert!(Salt::from_hex("0xef50").is_err());
    }

    #[test]
    fn stake_keys_differ_by_nonce() {
        let owner = AccountId::derive("staker");
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_ne!(StakeKey::derive(owner, 0, at), StakeKey::derive(owner, 1, at));
        assert_eq!(StakeKey::derive(owner, 7, at), StakeKey::derive(owner, 7, at));
    }

    #[test]
    fn event_id_ordering() {
        let a = EventId::new();
        let b = EventId::new();
        assert!(a < b);
    }

    #[test]
    fn serde_roundtrips() {
        let id = AccountId::derive("registry");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let salt = Salt::from_bytes([0xab; 32]);
        let json = serde_json::to_string(&salt).unwrap();
        assert_eq!(json, format!("\"{salt}\""));
        let back: Salt = serde_json::from_str(&json).unwrap();
        assert_eq!(salt, back);
    }
}
