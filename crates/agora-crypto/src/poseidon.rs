//! # Poseidon Hash over BN254
//!
//! Poseidon is the arithmetic-friendly hash used inside the response
//! attestation circuit. The same [`PoseidonConfig`] instance parameterizes
//! the native sponge here and the R1CS sponge gadget in `agora-zkp`, so a
//! digest computed off-circuit is exactly what the circuit recomputes.
//!
//! ## Parameters
//!
//! - Field: BN254 scalar field `Fr` (254-bit prime).
//! - Width 3 (rate 2, capacity 1), S-box `x^5`.
//! - 8 full rounds, 57 partial rounds.
//! - Round constants and MDS matrix from the Grain LFSR generator with no
//!   skipped matrices.
//!
//! Inputs are absorbed one element at a time and a single element is
//! squeezed. Absorbing `[a, b]` element-wise yields the same state as
//! absorbing the slice, so native and in-circuit call sites stay simple.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{
    find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge,
};
use ark_crypto_primitives::sponge::{CryptographicSponge, FieldBasedCryptographicSponge};
use ark_ff::{BigInteger, PrimeField};

const FULL_ROUNDS: usize = 8;
const PARTIAL_ROUNDS: usize = 57;
const ALPHA: u64 = 5;
const RATE: usize = 2;
const CAPACITY: usize = 1;

/// The shared Poseidon configuration, generated once per process.
pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
    static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();
    CONFIG.get_or_init(|| {
        let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
            u64::from(Fr::MODULUS_BIT_SIZE),
            RATE,
            FULL_ROUNDS as u64,
            PARTIAL_ROUNDS as u64,
            0,
        );
        PoseidonConfig::new(FULL_ROUNDS, PARTIAL_ROUNDS, ALPHA, mds, ark, RATE, CAPACITY)
    })
}

/// Hash a sequence of field elements to one field element.
pub fn poseidon_hash(inputs: &[Fr]) -> Fr {
    let mut sponge = PoseidonSponge::<Fr>::new(poseidon_config());
    for input in inputs {
        sponge.absorb(input);
    }
    sponge
        .squeeze_native_field_elements(1)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// Interpret 32 big-endian bytes as a field element, reducing mod `r`.
///
/// SHA-256 and HMAC outputs are 256 bits while `Fr` is 254 bits, so the
/// reduction is lossy. It is deterministic, which is all the circuit needs.
pub fn field_from_bytes(bytes: &[u8; 32]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

/// Parse 32 big-endian bytes only if they are already a reduced encoding.
///
/// Verifiers use this for public inputs so that two distinct byte strings
/// can never name the same field element.
pub fn field_from_canonical_bytes(bytes: &[u8; 32]) -> Option<Fr> {
    let f = Fr::from_be_bytes_mod_order(bytes);
    (field_to_bytes(&f) == *bytes).then_some(f)
}

/// Encode a field element as 32 big-endian bytes.
pub fn field_to_bytes(f: &Fr) -> [u8; 32] {
    let be = f.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    let start = out.len().saturating_sub(be.len());
    out[start..].copy_from_slice(&be[be.len().saturating_sub(32)..]);
    out
}
