//! Pairing/field layer.
//!
//! Wraps `ark-bn254` with the exact surface the accumulator and CVC engines
//! need: scalars in `Zp`, group elements and exponentiation in `G1`/`G2`,
//! the asymmetric pairing `e: G1 x G2 -> GT`, canonical (de)serialization,
//! and a single domain-separated hash-to-scalar used (with distinct tags)
//! by both constructions.
//!
//! BN254 is hardcoded via plain type aliases rather than a curve-generic
//! trait — one curve, named plainly, no `PairingEngine` abstraction to
//! thread through every call site for a crate that will only ever
//! instantiate it once.

#![forbid(unsafe_code)]

use ark_bn254::{Bn254, Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{pairing::Pairing, pairing::PairingOutput, AffineRepr, CurveGroup};
use ark_ff::{PrimeField, UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::errors::GroupError;

/// Scalar field element (`Zp`).
pub type Scalar = Fr;
/// G1 group element (affine).
pub type G1 = G1Affine;
/// G2 group element (affine).
pub type G2 = G2Affine;
/// Target group element (`GT`), output of the pairing.
pub type Gt = PairingOutput<Bn254>;

/// Sample a uniform scalar.
pub fn random_scalar<R: RngCore + ?Sized>(rng: &mut R) -> Scalar {
    Scalar::rand(rng)
}

/// SHA-256 of `domain_tag || payload`, reduced modulo the scalar field's
/// order. Every call site must pass its own `domain_tag`; reusing a tag
/// across unrelated hash uses would let one construction's challenge act
/// as another's, which is exactly what the ACC `"ACC_SIG"` prefix exists
/// to prevent (spec "Hash domain separation").
pub fn hash_to_scalar(domain_tag: &[u8], payload: &[u8]) -> Scalar {
    let mut hasher = Sha256::new();
    hasher.update(domain_tag);
    hasher.update(payload);
    let digest = hasher.finalize();
    Scalar::from_be_bytes_mod_order(&digest)
}

/// The canonical G1 generator.
pub fn g1_generator() -> G1 {
    G1Affine::generator()
}

/// The canonical G2 generator.
pub fn g2_generator() -> G2 {
    G2Affine::generator()
}

/// `p^s` in G1.
pub fn g1_mul(p: G1, s: Scalar) -> G1 {
    (G1Projective::from(p) * s).into_affine()
}

/// `a * b` in G1 (additive notation for the group operation).
pub fn g1_add(a: G1, b: G1) -> G1 {
    (G1Projective::from(a) + G1Projective::from(b)).into_affine()
}

/// `p^s` in G2.
pub fn g2_mul(p: G2, s: Scalar) -> G2 {
    (G2Projective::from(p) * s).into_affine()
}

/// `a * b` in G2 (additive notation for the group operation).
pub fn g2_add(a: G2, b: G2) -> G2 {
    (G2Projective::from(a) + G2Projective::from(b)).into_affine()
}

/// The asymmetric pairing `e(a, b) -> GT`.
pub fn pairing(a: G1, b: G2) -> Gt {
    Bn254::pairing(a, b)
}

/// Is `p` the identity element of G1? First-class predicate, independent of
/// any particular serialized representation.
pub fn g1_is_identity(p: &G1) -> bool {
    p.is_zero()
}

/// Does `bytes` equal the canonical encoding of the G1 identity? Producers
/// occasionally hand back a non-canonical representation of the identity
/// (e.g. after multiplying out to nothing); verifiers normalize against
/// this before deserializing.
pub fn is_identity_encoding(bytes: &[u8]) -> bool {
    match serialize_g1(&G1Affine::identity()) {
        Ok(id_bytes) => id_bytes == bytes,
        Err(_) => false,
    }
}

/// Canonical (compressed) serialization of a scalar.
pub fn serialize_scalar(s: &Scalar) -> Vec<u8> {
    let mut buf = Vec::new();
    s.serialize_compressed(&mut buf).expect("scalar serialization is infallible");
    buf
}

/// Canonical (compressed) deserialization of a scalar.
pub fn deserialize_scalar(bytes: &[u8]) -> Result<Scalar, GroupError> {
    Scalar::deserialize_compressed(bytes).map_err(|_| GroupError::MalformedScalar { len: bytes.len() })
}

/// Canonical (compressed) serialization of a G1 element.
pub fn serialize_g1(p: &G1) -> Result<Vec<u8>, GroupError> {
    let mut buf = Vec::new();
    p.serialize_compressed(&mut buf)
        .map_err(|_| GroupError::MalformedElement { len: 0 })?;
    Ok(buf)
}

/// Canonical (compressed) deserialization of a G1 element.
pub fn deserialize_g1(bytes: &[u8]) -> Result<G1, GroupError> {
    G1Affine::deserialize_compressed(bytes).map_err(|_| GroupError::MalformedElement { len: bytes.len() })
}

/// Canonical (compressed) serialization of a G2 element.
pub fn serialize_g2(p: &G2) -> Result<Vec<u8>, GroupError> {
    let mut buf = Vec::new();
    p.serialize_compressed(&mut buf)
        .map_err(|_| GroupError::MalformedElement { len: 0 })?;
    Ok(buf)
}

/// Canonical (compressed) deserialization of a G2 element.
pub fn deserialize_g2(bytes: &[u8]) -> Result<G2, GroupError> {
    G2Affine::deserialize_compressed(bytes).map_err(|_| GroupError::MalformedElement { len: bytes.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_to_scalar_is_deterministic() {
        let a = hash_to_scalar(b"TAG", b"hello");
        let b = hash_to_scalar(b"TAG", b"hello");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_to_scalar_respects_domain_separation() {
        let a = hash_to_scalar(b"ACC_SIG", b"same-bytes");
        let b = hash_to_scalar(b"CVC_DATA", b"same-bytes");
        assert_ne!(a, b);
    }

    #[test]
    fn g1_roundtrips_through_serialization() {
        let g = g1_generator();
        let s = Scalar::from(7u64);
        let p = g1_mul(g, s);
        let bytes = serialize_g1(&p).unwrap();
        let back = deserialize_g1(&bytes).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn identity_round_trips_and_is_detected() {
        let id = G1Affine::identity();
        assert!(g1_is_identity(&id));
        let bytes = serialize_g1(&id).unwrap();
        let back = deserialize_g1(&bytes).unwrap();
        assert!(g1_is_identity(&back));
        assert!(is_identity_encoding(&bytes));
    }

    #[test]
    fn malformed_bytes_fail_to_deserialize() {
        let bad = vec![0xffu8; 3];
        assert!(deserialize_g1(&bad).is_err());
    }

    #[test]
    fn pairing_is_bilinear_smoke_check() {
        let g1 = g1_generator();
        let g2 = g2_generator();
        let a = Scalar::from(3u64);
        let b = Scalar::from(5u64);
        let lhs = pairing(g1_mul(g1, a), g2_mul(g2, b));
        let rhs = pairing(g1_mul(g1, a * b), g2);
        assert_eq!(lhs, rhs);
    }
}
