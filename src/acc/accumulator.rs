//! Low-level bilinear (Nguyen) accumulator math.
//!
//! `A = g1^{f(s)}` where `f(X) = prod (X + x_i)` over the current blacklist.
//! This module owns the group-algebra half of that equation (setup, the
//! additive update `A <- A^{y+s}`, witness construction from the powers
//! cache, and the pairing check); `acc::engine` owns the control flow
//! (encoding, signing, storage).

#![forbid(unsafe_code)]

use rand::RngCore;

use crate::errors::StorageError;
use crate::group::{self, Scalar, G1, G2};

/// The client-held accumulator trapdoor and base.
#[derive(Debug, Clone)]
pub struct AccKey {
    pub s: Scalar,
    pub g1: G1,
}

/// The mutable accumulator state: current value, update count, and the
/// cached powers `[g1, g1^s, g1^{s^2}, ...]` (always at least `|blacklist|+1`
/// entries, extended by one on every `acc_add`).
#[derive(Debug, Clone)]
pub struct AccState {
    pub value: G1,
    pub upto: u64,
    pub powers: Vec<G1>,
}

/// Generate `(g1, h, h^s)` together with a fresh trapdoor `s`, and the
/// initial empty-blacklist state `A = g1`, `powers = [g1, g1^s]`.
///
/// `h` and `h^s` come out of this one call, never reconstructed separately
/// later against a different trapdoor.
pub fn acc_setup<R: RngCore + ?Sized>(rng: &mut R) -> (AccKey, AccState, G2, G2) {
    let s = group::random_scalar(rng);
    let g1 = group::g1_generator();
    let h = group::g2_mul(group::g2_generator(), group::random_scalar(rng));
    let hs = group::g2_mul(h, s);

    let key = AccKey { s, g1 };
    let state = AccState {
        value: g1,
        upto: 0,
        powers: vec![g1, group::g1_mul(g1, s)],
    };
    (key, state, h, hs)
}

/// `A <- A^{y+s}`; extend the powers cache by one more power of `s`.
/// Mirrors `f(X) <- f(X) * (X+y)` on the server's polynomial, which the
/// caller is responsible for applying to its own copy of `f`.
pub fn acc_add(key: &AccKey, st: &mut AccState, y: Scalar) {
    st.value = group::g1_mul(st.value, y + key.s);
    st.upto += 1;
    let next = group::g1_mul(*st.powers.last().expect("powers cache is never empty"), key.s);
    st.powers.push(next);
}

/// `w = prod_k powers[k]^{Q_k}` in G1.
pub fn build_witness(powers: &[G1], q_coeffs: &[Scalar]) -> Result<G1, StorageError> {
    use ark_ec::AffineRepr;
    if q_coeffs.len() > powers.len() {
        return Err(StorageError::InsufficientPowers {
            need: q_coeffs.len(),
            have: powers.len(),
        });
    }
    let mut w = G1::identity();
    for (k, &qk) in q_coeffs.iter().enumerate() {
        w = group::g1_add(w, group::g1_mul(powers[k], qk));
    }
    Ok(w)
}

/// The non-membership pairing check: `e(w, h^y * hs) == e(A * g1^{-v}, h)`.
pub fn verify_equation(w: G1, h: G2, hs: G2, y: Scalar, a: G1, g1: G1, v: Scalar) -> bool {
    let rhs_g2 = group::g2_add(group::g2_mul(h, y), hs);
    let lhs = group::pairing(w, rhs_g2);

    let a_minus_v = group::g1_add(a, group::g1_mul(g1, -v));
    let rhs = group::pairing(a_minus_v, h);
    lhs == rhs
}
