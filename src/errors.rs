//! Crate-wide error taxonomy.
//!
//! Four kinds, shared by both constructions (VDS-ACC and VDS-CVC):
//! [`VerifyError`], [`DecodeError`], [`GroupError`], [`StorageError`].
//! `verify()` itself is total (returns `bool`, see `acc::engine`/
//! `cvc::engine`); these types are for the fallible internal paths that
//! feed into it and for `append`/`query`/`update`.

#![forbid(unsafe_code)]

/// A proof failed to authenticate against the claimed root.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("proof scheme tag `{found}` does not match expected `{expected}`")]
    SchemeMismatch { expected: &'static str, found: String },
    #[error("signature did not verify over the encoded item")]
    BadSignature,
    #[error("pairing equation did not hold")]
    PairingFailed,
    #[error("root digest mismatch")]
    RootMismatch,
    #[error("signed base h_{0} failed to verify against the setup verification key")]
    BadSignedBase(u32),
}

/// Malformed encoded item, proof payload, or stored record.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer too short: need at least {need} bytes, got {got}")]
    Truncated { need: usize, got: usize },
    #[error("length field {field} exceeds remaining buffer")]
    LengthOverflow { field: &'static str },
    #[error("negative index is not representable")]
    NegativeIndex,
}

/// Setup not completed, bad group element, or pairing-layer failure.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("malformed group element bytes ({len} bytes)")]
    MalformedElement { len: usize },
    #[error("malformed scalar bytes ({len} bytes)")]
    MalformedScalar { len: usize },
}

/// Missing item or inconsistent engine/server state.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("no item at index {0}")]
    ItemNotFound(u64),
    #[error("accumulator state not initialized")]
    AccStateNotSet,
    #[error("root for scheme `{0}` not set")]
    RootNotSet(String),
    #[error("polynomial division had a non-zero remainder; blacklist/log is corrupted")]
    NonZeroRemainder,
    #[error("insufficient cached powers: need degree {need}, have {have}")]
    InsufficientPowers { need: usize, have: usize },
    #[error("no CVC node materialized at index {0}")]
    NodeNotFound(u64),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Group(#[from] GroupError),
}
