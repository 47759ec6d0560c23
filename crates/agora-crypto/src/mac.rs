//! # HMAC-SHA256 Keyed Derivation
//!
//! Session tokens are `HMAC-SHA256(instance_key, nonce || peer_did)` and
//! agent key proofs are `HMAC-SHA256(agent_secret, identity_hash)`. Both
//! keys are held in [`SecretKey`], which zeroizes on drop and never prints
//! its contents.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::random::random_bytes;

/// A 32-byte symmetric secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Draw a fresh key from the OS CSPRNG.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self(random_bytes::<32>()?))
    }

    /// Wrap existing key material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let mut raw = hex::decode(s.trim()).map_err(|e| CryptoError::HexDecode(e.to_string()))?;
        if raw.len() != 32 {
            let len = raw.len();
            raw.zeroize();
            return Err(CryptoError::InvalidKeyLength(format!(
                "expected 32 bytes, got {len}"
            )));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        Ok(Self(bytes))
    }

    /// Hex-encode the key. The caller owns the returned secret.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Keyed MAC over the concatenation of `parts`.
    pub fn mac(&self, parts: &[&[u8]]) -> Result<[u8; 32], CryptoError> {
        hmac_sha256(&self.0, parts)
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// HMAC-SHA256 over the concatenation of `parts`.
pub fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 32], CryptoError> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
        .map_err(|e| CryptoError::InvalidKeyLength(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4231_test_case_2() {
        let tag = hmac_sha256(b"Jefe", &[&b"what do ya want "[..], &b"for nothing?"[..]]).unwrap();
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = SecretKey::from_bytes([0xAB; 32]);
        let dbg = format!("{key:?}");
        assert!(!dbg.contains("ab"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn hex_roundtrip() {
        let key = SecretKey::generate().unwrap();
        let parsed = SecretKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key.mac(&[b"x".as_slice()]).unwrap(), parsed.mac(&[b"x".as_slice()]).unwrap());
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            SecretKey::from_hex("abcd"),
            Err(CryptoError::InvalidKeyLength(_))
        ));
        assert!(matches!(
            SecretKey::from_hex("not hex"),
            Err(CryptoError::HexDecode(_))
        ));
    }

    #[test]
    fn distinct_keys_give_distinct_tags() {
        let a = SecretKey::generate().unwrap();
        let b = SecretKey::generate().unwrap();
        assert_ne!(a.mac(&[b"msg".as_slice()]).unwrap(), b.mac(&[b"msg".as_slice()]).unwrap());
    }
}
