//! VDS-ACC data model: index-bound signatures plus a bilinear accumulator
//! over a blacklist of superseded signatures.

pub mod accumulator;
pub mod engine;

pub use engine::VdsAcc;

use crate::group::{G1, G2};

/// A live item: `(data, tag, index, sigma)`. Replaced wholesale on update;
/// the old `sigma` is what gets blacklisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub data: Vec<u8>,
    pub tag: [u8; 16],
    pub index: u64,
    pub sigma: [u8; 64],
}

/// Public parameters: everything a verifier needs, refreshed after every
/// `update` (`accumulator` mutates; everything else is immutable after
/// `setup`).
#[derive(Debug, Clone)]
pub struct AccPublic {
    pub g1: G1,
    pub h: G2,
    pub hs: G2,
    pub vk: [u8; 32],
    pub accumulator: G1,
}

/// Client-held state: signing key, accumulator trapdoor, and the powers
/// cache. Mutated by `append`/`update`.
#[derive(Debug, Clone)]
pub struct AccClientState {
    pub ssk: [u8; 32],
    pub vk: [u8; 32],
    pub s: crate::group::Scalar,
    pub g1: G1,
    pub h: G2,
    pub hs: G2,
    pub a: G1,
    pub powers: Vec<G1>,
    pub upto: u64,
    pub cnt: u64,
}

/// The non-membership proof payload returned by `query`. Field names match
/// spec.md §6's wire map (`sigma`, `w`, `u`, `tag`) one-for-one.
#[derive(Debug, Clone)]
pub struct AccProof {
    pub sigma: [u8; 64],
    pub w: G1,
    pub u: crate::group::Scalar,
    pub tag: [u8; 16],
}
