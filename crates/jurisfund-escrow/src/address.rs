//! Deterministic escrow addressing.
//!
//! An escrow's address is a pure function of the salt chosen by the
//! deployer, the shared implementation identity and the registry identity.
//! It does not depend on deployment order, so funds can be sent to an
//! address before the escrow living there exists.

use jurisfund_types::{AccountId, Salt};
use sha2::{Digest, Sha256};

/// Address a deployment with `salt` will occupy.
///
/// ```text
/// address = SHA-256("jurisfund:escrow:v1:" || registry || implementation || salt)[..20]
/// ```
#[must_use]
pub fn derive_escrow_address(
    salt: &Salt,
    implementation: &AccountId,
    registry: &AccountId,
) -> AccountId {
    let mut hasher = Sha256::new();
    hasher.update(b"jurisfund:escrow:v1:");
    hasher.update(registry.as_bytes());
    hasher.update(implementation.as_bytes());
    hasher.update(salt.as_bytes());
    let hash = hasher.finalize();

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[..20]);
    AccountId::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salt(byte: u8) -> Salt {
        Salt::from_bytes([byte; 32])
    }

    #[test]
    fn same_inputs_same_address() {
        let imp = AccountId::derive("implementation");
        let reg = AccountId::derive("registry");
        assert_eq!(
            derive_escrow_address(&salt(1), &imp, &reg),
            derive_escrow_address(&salt(1), &imp, &reg)
        );
    }

    #[test]
    fn every_input_matters() {
        let imp = AccountId::derive("implementation");
        let reg = AccountId::derive("registry");
        let base = derive_escrow_address(&salt(1), &imp, &reg);
        assert_ne!(base, derive_escrow_address(&salt(2), &imp, &reg));
        assert_ne!(
            base,
            derive_escrow_address(&salt(1), &AccountId::derive("other"), &reg)
        );
        assert_ne!(
            base,
            derive_escrow_address(&salt(1), &imp, &AccountId::derive("other"))
        );
    }

    #[test]
    fn registry_and_implementation_not_interchangeable() {
        let a = AccountId::derive("a");
        let b = AccountId::derive("b");
        assert_ne!(
            derive_escrow_address(&salt(9), &a, &b),
            derive_escrow_address(&salt(9), &b, &a)
        );
    }

    #[test]
    fn derives_from_hex_salt() {
        let s = Salt::from_hex(
            "0xef50095700000000000000000000000000000000000000000000000000000000",
        )
        .unwrap();
        let addr = derive_escrow_address(
            &s,
            &AccountId::derive("implementation"),
            &AccountId::derive("registry"),
        );
        assert!(!addr.is_zero());
    }
}
