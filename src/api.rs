//! Ergonomic entry points over the two engines.
//!
//! A thin layer that wires sane defaults (a fresh `OsRng`, an owned
//! `MemStore`) over the engine methods `setup`/`append`/`query`/`verify`/
//! `update` already expose. It does not add any surface those methods
//! don't have.

#![forbid(unsafe_code)]

use rand::rngs::OsRng;

use crate::acc::{AccClientState, AccPublic};
use crate::cvc::CvcClientState;
use crate::storage::MemStore;
use crate::{VdsAcc, VdsCvc};

/// `VdsAcc::setup` over a fresh `OsRng` and an owned `MemStore`.
pub fn setup_acc() -> (AccPublic, AccClientState, MemStore) {
    let mut store = MemStore::new();
    let (public, client) = VdsAcc::setup(&mut OsRng, &mut store);
    (public, client, store)
}

/// `VdsCvc::setup(q)` over a fresh `OsRng` and an owned `MemStore`.
pub fn setup_cvc(q: usize) -> (CvcClientState, MemStore) {
    let mut store = MemStore::new();
    let client = VdsCvc::setup(&mut OsRng, &mut store, q);
    (client, store)
}

#[cfg(feature = "dev-deterministic-setup")]
pub mod dev {
    //! Deterministic setup for tests: a seeded `StdRng` in place of
    //! `OsRng`. Never reachable without the `dev-deterministic-setup`
    //! feature, so there is no silent non-determinism trap in the default
    //! build.

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::acc::{AccClientState, AccPublic};
    use crate::cvc::CvcClientState;
    use crate::storage::MemStore;
    use crate::{VdsAcc, VdsCvc};

    /// `VdsAcc::setup` over `StdRng::seed_from_u64(seed)`.
    pub fn setup_acc_with_rng(seed: u64) -> (AccPublic, AccClientState, MemStore) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut store = MemStore::new();
        let (public, client) = VdsAcc::setup(&mut rng, &mut store);
        (public, client, store)
    }

    /// `VdsCvc::setup(q)` over `StdRng::seed_from_u64(seed)`.
    pub fn setup_cvc_with_rng(seed: u64, q: usize) -> (CvcClientState, MemStore) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut store = MemStore::new();
        let client = VdsCvc::setup(&mut rng, &mut store, q);
        (client, store)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn deterministic_setup_is_reproducible() {
            let (pub_a, _, _) = setup_acc_with_rng(42);
            let (pub_b, _, _) = setup_acc_with_rng(42);
            assert_eq!(pub_a.g1, pub_b.g1);
            assert_eq!(pub_a.h, pub_b.h);
            assert_eq!(pub_a.vk, pub_b.vk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_acc_produces_a_usable_engine() {
        let (mut public, mut client, mut store) = setup_acc();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, b"hello").unwrap();
        public.accumulator = client.a;
        let proof = VdsAcc::query(&store, 1).unwrap();
        assert!(VdsAcc::verify(&public, 1, b"hello", &proof));
    }

    #[test]
    fn setup_cvc_produces_a_usable_engine() {
        let (mut client, mut store) = setup_cvc(4);
        VdsCvc::append(&mut client, &mut store, b"hello").unwrap();
        let public = client.to_public();
        let proof = VdsCvc::query(&client.pk, &client.bootstrap, &store, 1).unwrap();
        assert!(VdsCvc::verify(&public, 1, b"hello", &proof));
    }
}
