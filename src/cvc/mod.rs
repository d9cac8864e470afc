//! VDS-CVC data model: a q-ary tree of Chameleon Vector Commitments.

pub mod engine;
pub mod tree;

pub use engine::VdsCvc;

use crate::group::{G1, G2};

/// Public key material: the base `g`, one signed `h_i` per slot `1..=q+1`,
/// and the tree arity `q`.
#[derive(Debug, Clone)]
pub struct CvcParamsPk {
    pub g: G1,
    /// The G2 generator, used only as the fixed second argument to
    /// `tree::verify_slot`'s pairing check (`g`'s G1 incarnation is the
    /// commitment base above; this is the same abstract generator, other
    /// group).
    pub g2: G2,
    /// `(h_i, signature over h_i_bytes || u32 BE i)`, indexed `0..q+1` for
    /// slots `1..=q+1`.
    pub signed_hi: Vec<(G1, [u8; 64])>,
    pub q: usize,
}

/// Secret key material: the PRF seed and the per-slot trapdoors. Per
/// DESIGN.md's Open Question 3, `trapdoors` is write-only after `keygen` —
/// kept here for data-model fidelity with spec.md §3, never read again by
/// `engine`.
#[derive(Debug, Clone)]
pub struct CvcParamsSk {
    pub prf_key: [u8; 32],
    pub trapdoors: Vec<crate::group::Scalar>,
    pub q: usize,
}

/// Server-side bootstrap: the `h_i` list (G1, for commitment arithmetic, and
/// its G2 dual, for the pairing check), the `h_{i,j}` cross-term table
/// (`i != j`, both in `1..=q+1`, G1 only — it never appears on either side
/// of a pairing), and the verification key for the signed-`h_i` bindings.
#[derive(Debug, Clone)]
pub struct CvcBootstrap {
    pub h_list: Vec<G1>,
    pub h_list_g2: Vec<G2>,
    pub cross: std::collections::HashMap<(u32, u32), G1>,
    pub vk: [u8; 32],
}

/// One opened/verified node on a query path.
#[derive(Debug, Clone)]
pub struct CvcSegment {
    pub node_commit: G1,
    pub proof: G1,
    pub h: G1,
    pub h_g2: G2,
    pub signed_hi: [u8; 64],
    pub slot: u32,
}

/// The query proof payload, field names matching spec.md §6's wire map.
#[derive(Debug, Clone)]
pub struct CvcProof {
    pub leaf_commit: G1,
    pub leaf_pi: G1,
    pub leaf_h: G1,
    pub leaf_h_g2: G2,
    pub leaf_signed_hi: [u8; 64],
    pub segments: Vec<CvcSegment>,
}

/// Client-held state: key material, bootstrap, root digest, and item
/// count.
#[derive(Debug, Clone)]
pub struct CvcClientState {
    pub pk: CvcParamsPk,
    pub sk: CvcParamsSk,
    pub bootstrap: CvcBootstrap,
    pub root: G1,
    pub cnt: u64,
}

/// Verifier-facing view: everything needed by `VdsCvc::verify`, with no
/// trapdoor material. Mirrors `acc::AccPublic`'s split from
/// `AccClientState`.
#[derive(Debug, Clone)]
pub struct CvcPublic {
    pub pk: CvcParamsPk,
    pub bootstrap: CvcBootstrap,
    pub root: G1,
}

impl CvcClientState {
    pub fn to_public(&self) -> CvcPublic {
        CvcPublic {
            pk: self.pk.clone(),
            bootstrap: self.bootstrap.clone(),
            root: self.root,
        }
    }
}
