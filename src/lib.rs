//! Verifiable data streaming: a client with small local state appends items
//! to an untrusted server's append-only log, queries any index with a short
//! correctness proof, and updates items in place — all authenticated by a
//! succinct root digest.
//!
//! Two interchangeable constructions:
//! - [`acc`] (VDS-ACC): index-bound Ed25519 signatures, superseded ones
//!   blacklisted in a bilinear (Nguyen) accumulator.
//! - [`cvc`] (VDS-CVC): a q-ary tree of Chameleon Vector Commitments.
//!
//! Both sit on a shared pairing/field layer ([`group`]) and polynomial
//! layer ([`poly`]). [`api`] provides the ergonomic entry points
//! (`setup_acc`, `setup_cvc`); the engines ([`acc::VdsAcc`], [`cvc::VdsCvc`])
//! are usable directly for callers that want to own their storage and RNG.

#![forbid(unsafe_code)]

pub mod acc;
pub mod api;
pub mod cvc;
pub mod encoding;
pub mod errors;
pub mod group;
pub mod poly;
pub mod sig;
pub mod storage;

pub use acc::VdsAcc;
pub use cvc::VdsCvc;
pub use group::{Gt, Scalar, G1, G2};
pub use storage::Scheme;

// `AppendReceipt`/`UpdateReceipt` are per-engine (`acc::engine`,
// `cvc::engine`) rather than unified here: an ACC root is an accumulator
// value, a CVC root is a tree commitment, and the two are never compared
// to each other, so a single crate-root type would only erase that
// distinction. Both are re-exported at the crate root for callers who
// don't need the `acc`/`cvc` module path spelled out.
pub use acc::engine::{AppendReceipt as AccAppendReceipt, UpdateReceipt as AccUpdateReceipt};
pub use cvc::engine::{AppendReceipt as CvcAppendReceipt, UpdateReceipt as CvcUpdateReceipt};
