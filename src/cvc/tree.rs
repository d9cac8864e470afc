//! q-ary tree mechanics and per-slot CVC algebra.
//!
//! Heap-style, 1-indexed, root at `idx == 1`. For `x > 1`:
//! `parent(x) = floor((x-2)/q) + 1`, and the 1-indexed slot within the
//! parent's `m`-vector is `slot(x) + 1` (slot `1` is reserved for the
//! node's own data value; slots `2..=q+1` are child pointers).

#![forbid(unsafe_code)]

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::group::{self, Scalar, G1, G2};

type HmacSha256 = Hmac<Sha256>;

/// `parent(x) = floor((x-2)/q) + 1`, for `x > 1`.
pub fn parent(x: u64, q: usize) -> u64 {
    debug_assert!(x > 1, "the root has no parent");
    (x - 2) / (q as u64) + 1
}

/// 1-indexed child slot of `x` within its parent, in `1..=q`.
pub fn slot(x: u64, q: usize) -> u32 {
    debug_assert!(x > 1, "the root has no slot");
    let p = parent(x, q);
    (x - ((q as u64) * (p - 1) + 2) + 1) as u32
}

/// Index into a node's `m`-vector for child slot `slot` (`1..=q`): slot `1`
/// of the vector is the leaf data value, so child pointers start at 2.
pub fn slot_idx(slot: u32) -> usize {
    slot as usize + 1
}

/// `idx` of the child of `p` occupying child-slot `s` (`1..=q`). Inverse of
/// `(parent, slot)`.
pub fn child_idx(p: u64, s: u32, q: usize) -> u64 {
    (q as u64) * (p - 1) + 2 + (s as u64 - 1)
}

/// `PRF(prf_key, idx)`, an HMAC-SHA256 over the big-endian counter, mapped
/// into `Zp`. Grounded on `examples/original_source/vds/common/prf.py`.
pub fn prf_scalar(prf_key: &[u8; 32], idx: u64) -> Scalar {
    let mut mac = HmacSha256::new_from_slice(prf_key).expect("HMAC accepts any key length");
    mac.update(&idx.to_be_bytes());
    let out = mac.finalize().into_bytes();
    group::hash_to_scalar(b"CVC_PRF", &out)
}

/// In-memory node state: `r`, the `q+1`-length `m`-vector, and the
/// commitment `C = commit_vec(r, m)`.
#[derive(Debug, Clone)]
pub struct NodeState {
    pub r: Scalar,
    pub m: Vec<Scalar>,
    pub c: G1,
}

impl NodeState {
    /// A freshly touched node: `m` all-zero, `C = g^r`.
    pub fn fresh(g: G1, r: Scalar, q: usize) -> Self {
        let c = group::g1_mul(g, r);
        Self { r, m: vec![Scalar::from(0u64); q + 1], c }
    }
}

/// `commit_vec(r, m) = g^r * prod_{i: m_i != 0} h_i^{m_i}`. Zero components
/// are skipped (they contribute the identity).
pub fn commit_vec(g: G1, h_list: &[G1], r: Scalar, m: &[Scalar]) -> G1 {
    use ark_ff::Zero;
    let mut acc = group::g1_mul(g, r);
    for (h_i, &m_i) in h_list.iter().zip(m.iter()) {
        if !m_i.is_zero() {
            acc = group::g1_add(acc, group::g1_mul(*h_i, m_i));
        }
    }
    acc
}

/// `pi_i = h_i^r * prod_{j != i} h_{i,j}^{m_j}`, the opening for slot `i`
/// (1-indexed into the `m`-vector, `1..=q+1`).
pub fn open_slot(
    h_list: &[G1],
    cross: &std::collections::HashMap<(u32, u32), G1>,
    i: usize,
    r: Scalar,
    m: &[Scalar],
) -> G1 {
    use ark_ff::Zero;
    let mut acc = group::g1_mul(h_list[i - 1], r);
    for (j0, &m_j) in m.iter().enumerate() {
        let j = j0 + 1;
        if j == i || m_j.is_zero() {
            continue;
        }
        if let Some(&h_ij) = cross.get(&(i as u32, j as u32)) {
            acc = group::g1_add(acc, group::g1_mul(h_ij, m_j));
        }
    }
    acc
}

/// `e(C * h_i^{-m_i}, h_i) == e(pi_i, g)`.
///
/// The commitment algebra (`commit_vec`, `open_slot`) lives entirely in G1,
/// since `C` and `pi_i` are G1 elements added alongside `g^r`. The pairing
/// check is asymmetric (`e: G1 x G2 -> GT`, shared with `acc::accumulator`),
/// so it needs `h_i` and the generator in their G2 incarnations as well —
/// same discrete log, second group, published alongside the G1 values only
/// for use as the pairing's second argument.
/// `h_i_g2` and `g2` are published once at setup and carried in
/// `CvcBootstrap`/`CvcParamsPk`; they play no role in the exponentiation
/// math above.
pub fn verify_slot(c: G1, h_i_g1: G1, h_i_g2: G2, m_i: Scalar, pi_i: G1, g2: G2) -> bool {
    let c_adj = group::g1_add(c, group::g1_mul(h_i_g1, -m_i));
    let lhs = group::pairing(c_adj, h_i_g2);
    let rhs = group::pairing(pi_i, g2);
    lhs == rhs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_indexing_is_consistent_with_child_idx() {
        let q = 4usize;
        for p in 1u64..=5 {
            for s in 1u32..=q as u32 {
                let c = child_idx(p, s, q);
                assert_eq!(parent(c, q), p);
                assert_eq!(slot(c, q), s);
            }
        }
    }

    #[test]
    fn root_has_no_parent_by_construction() {
        // idx 2..=q+1 are the root's children.
        let q = 8usize;
        for c in 2u64..=(q as u64 + 1) {
            assert_eq!(parent(c, q), 1);
        }
    }

    #[test]
    fn prf_is_deterministic_and_index_sensitive() {
        let key = [7u8; 32];
        let a = prf_scalar(&key, 42);
        let b = prf_scalar(&key, 42);
        let c = prf_scalar(&key, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn commit_open_verify_round_trip_at_every_slot() {
        let q = 3usize;
        let g = group::g1_generator();
        let g2 = group::g2_generator();
        let zs: Vec<Scalar> = (1..=q as u64 + 1).map(Scalar::from).collect();
        let h_list: Vec<G1> = zs.iter().map(|&z| group::g1_mul(g, z)).collect();
        let h_list_g2: Vec<G2> = zs.iter().map(|&z| group::g2_mul(g2, z)).collect();
        let mut cross = std::collections::HashMap::new();
        for i in 1..=(q as u32 + 1) {
            for j in 1..=(q as u32 + 1) {
                if i == j {
                    continue;
                }
                let zij = zs[(i - 1) as usize] * zs[(j - 1) as usize];
                cross.insert((i, j), group::g1_mul(g, zij));
            }
        }

        let r = Scalar::from(11u64);
        let m: Vec<Scalar> = (0..q + 1).map(|k| Scalar::from(100u64 + k as u64)).collect();
        let c = commit_vec(g, &h_list, r, &m);

        for i in 1..=q + 1 {
            let pi = open_slot(&h_list, &cross, i, r, &m);
            assert!(verify_slot(c, h_list[i - 1], h_list_g2[i - 1], m[i - 1], pi, g2));
        }
    }
}
