//! # Constant-Time Comparison
//!
//! ## Security Invariant
//!
//! Secret-dependent equality (session tokens, MAC tags) must not leak the
//! position of the first differing byte through timing. Length is not
//! secret: every token is 64 hex characters, and a length mismatch returns
//! `false` immediately.

use subtle::ConstantTimeEq;

/// Compare two byte strings in constant time with respect to their contents.
pub fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    provided.ct_eq(expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs_match() {
        assert!(constant_time_eq(b"abc123", b"abc123"));
    }

    #[test]
    fn differing_inputs_do_not_match() {
        assert!(!constant_time_eq(b"abc123", b"abc124"));
        assert!(!constant_time_eq(b"abc", b"abc123"));
        assert!(!constant_time_eq(b"", b"x"));
    }

    #[test]
    fn empty_inputs_match() {
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn length_mismatch_is_unequal_even_with_shared_prefix() {
        assert!(!constant_time_eq(b"deadbeef", b"deadbeef00"));
        assert!(!constant_time_eq(b"deadbeef00", b"deadbeef"));
    }

    mod proptests {
        use crate::ct::constant_time_eq;
        use crate::mac::SecretKey;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn agrees_with_byte_equality(
                a in proptest::collection::vec(any::<u8>(), 0..48),
                b in proptest::collection::vec(any::<u8>(), 0..48),
            ) {
                prop_assert_eq!(constant_time_eq(&a, &b), a == b);
                prop_assert!(constant_time_eq(&a, &a));
            }

            #[test]
            fn token_rejects_any_single_char_change(
                peer in "did:key:[a-zA-Z0-9]{1,24}",
                idx in 0usize..64,
            ) {
                let key = SecretKey::from_bytes([7u8; 32]);
                let token = hex::encode(key.mac(&[peer.as_bytes()]).unwrap());
                let mut forged = token.clone().into_bytes();
                forged[idx] = if forged[idx] == b'0' { b'1' } else { b'0' };
                prop_assert!(constant_time_eq(token.as_bytes(), token.as_bytes()));
                prop_assert!(!constant_time_eq(&forged, token.as_bytes()));
            }
        }
    }
}
