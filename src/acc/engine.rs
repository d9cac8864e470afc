//! `VdsAcc`: the VDS-ACC logical API — `setup`/`append`/`query`/`verify`/
//! `update` — orchestrating `acc::accumulator`'s group algebra, `sig`,
//! `encoding`, and a caller-supplied [`AccStorage`] + [`RootStore`].
//!
//! Grounded on `examples/original_source/vds/acc/vds_acc.py`'s control
//! flow: server-authoritative index assignment, a fresh 16-byte tag on
//! every append/update, and the identity-witness normalization at verify
//! time.

#![forbid(unsafe_code)]

use rand::RngCore;
use tracing::debug;

use crate::acc::accumulator::{self, AccKey, AccState};
use crate::acc::{AccClientState, AccProof, AccPublic, Item};
use crate::encoding;
use crate::errors::{StorageError, VerifyError};
use crate::group::{self, Scalar, G1};
use crate::sig;
use crate::storage::{AccItemRecord, AccStorage, RootStore, Scheme};

/// Domain-separation tag for hashing a signature into the accumulator's
/// `Zp`. Reserved exclusively for this use (spec "Hash domain separation").
const ACC_SIG_TAG: &[u8] = b"ACC_SIG";

/// Receipt returned by `append`.
#[derive(Debug, Clone)]
pub struct AppendReceipt {
    pub index: u64,
    pub root: G1,
}

/// Receipt returned by `update`.
#[derive(Debug, Clone)]
pub struct UpdateReceipt {
    pub index: u64,
    pub root: G1,
}

/// The VDS-ACC engine. Holds no storage itself — every method borrows a
/// caller-supplied store, so the engine is freely reusable across stores
/// (e.g. the export/import scenario in spec.md S4).
pub struct VdsAcc;

impl VdsAcc {
    /// Sample fresh signing keys and accumulator parameters; initialize
    /// `store` to the empty-log state. Returns `(public, client_state)`.
    pub fn setup<R, S>(rng: &mut R, store: &mut S) -> (AccPublic, AccClientState)
    where
        R: RngCore + rand::CryptoRng,
        S: AccStorage + RootStore,
    {
        let (ssk, vk) = sig::keygen(rng);
        let (key, state, h, hs): (AccKey, AccState, _, _) = accumulator::acc_setup(rng);

        store
            .set_state(
                group::serialize_g1(&state.value).unwrap(),
                state.powers.iter().map(|p| group::serialize_g1(p).unwrap()).collect(),
            )
            .expect("fresh store accepts initial state");
        store
            .set_poly(vec![group::serialize_scalar(&Scalar::from(1u64))])
            .expect("fresh store accepts initial polynomial");
        store.set_root(Scheme::Acc, group::serialize_g1(&state.value).unwrap());

        let public = AccPublic {
            g1: key.g1,
            h,
            hs,
            vk,
            accumulator: state.value,
        };
        let client = AccClientState {
            ssk,
            vk,
            s: key.s,
            g1: key.g1,
            h,
            hs,
            a: state.value,
            powers: state.powers,
            upto: 0,
            cnt: 0,
        };
        (public, client)
    }

    /// Append `data`. The index is server-authoritative (`store.count() + 1`);
    /// `client.cnt` is only a hint, kept for `export_client_state`.
    pub fn append<R, S>(
        rng: &mut R,
        client: &mut AccClientState,
        store: &mut S,
        data: &[u8],
    ) -> Result<AppendReceipt, StorageError>
    where
        R: RngCore + ?Sized,
        S: AccStorage,
    {
        let idx = store.count()? + 1;
        let mut tag = [0u8; 16];
        rng.fill_bytes(&mut tag);
        let msg = encoding::encode_item(data, &tag, idx);
        let sigma = sig::sign(&client.ssk, &msg);
        store.save_item(AccItemRecord {
            data: data.to_vec(),
            tag,
            index: idx,
            sigma,
        })?;
        client.cnt = idx;
        debug!(index = idx, "acc append");
        Ok(AppendReceipt { index: idx, root: client.a })
    }

    /// Build a non-membership proof for the signature currently stored at
    /// `idx`.
    pub fn query<S>(store: &S, idx: u64) -> Result<AccProof, StorageError>
    where
        S: AccStorage,
    {
        let item = store.get_item(idx)?;
        let (coeffs, powers) = load_poly_and_powers(store)?;

        let y = group::hash_to_scalar(ACC_SIG_TAG, &item.sigma);
        let v = crate::poly::eval(&coeffs, -y);
        let q = crate::poly::div_by_linear(&coeffs, y)?;
        let w = accumulator::build_witness(&powers, &q)?;

        Ok(AccProof {
            sigma: item.sigma,
            w,
            u: v,
            tag: item.tag,
        })
    }

    /// Verify `proof` claims `data` is the current content at `idx` under
    /// `pub_params`. Total: any failure returns `false`, never panics or
    /// raises.
    pub fn verify(pub_params: &AccPublic, idx: u64, data: &[u8], proof: &AccProof) -> bool {
        let ok = Self::verify_inner(pub_params, idx, data, proof).unwrap_or(false);
        debug!(index = idx, ok, "acc verify");
        ok
    }

    fn verify_inner(
        pub_params: &AccPublic,
        idx: u64,
        data: &[u8],
        proof: &AccProof,
    ) -> Result<bool, VerifyError> {
        let msg = encoding::encode_item(data, &proof.tag, idx);
        if !sig::verify(&pub_params.vk, &msg, &proof.sigma) {
            return Err(VerifyError::BadSignature);
        }

        // A producer may hand back a non-canonical identity encoding, which
        // is treated as the identity value itself. Since `w` here is
        // already a parsed G1 element (not raw bytes), the normalization is
        // equivalent to checking it against the identity directly;
        // `group::is_identity_encoding` exists for callers that
        // still hold the raw wire bytes (e.g. a deserializing transport).
        let w = proof.w;

        let y = group::hash_to_scalar(ACC_SIG_TAG, &proof.sigma);
        let ok = accumulator::verify_equation(
            w,
            pub_params.h,
            pub_params.hs,
            y,
            pub_params.accumulator,
            pub_params.g1,
            proof.u,
        );
        if ok {
            Ok(true)
        } else {
            Err(VerifyError::PairingFailed)
        }
    }

    /// Blacklist the signature currently at `idx`, then replace the item
    /// with `new_data` under a fresh tag and signature. Returns the new
    /// root (`client.a`, already updated).
    pub fn update<R, S>(
        rng: &mut R,
        client: &mut AccClientState,
        store: &mut S,
        idx: u64,
        new_data: &[u8],
    ) -> Result<UpdateReceipt, StorageError>
    where
        R: RngCore + ?Sized,
        S: AccStorage,
    {
        let old = store.get_item(idx)?;
        let y = group::hash_to_scalar(ACC_SIG_TAG, &old.sigma);

        let key = AccKey { s: client.s, g1: client.g1 };
        let mut state = AccState {
            value: client.a,
            upto: client.upto,
            powers: client.powers.clone(),
        };
        accumulator::acc_add(&key, &mut state, y);
        client.a = state.value;
        client.upto = state.upto;
        client.powers = state.powers;

        let (coeffs, _powers) = load_poly_and_powers(store)?;
        let new_coeffs = crate::poly::mul_by_linear(&coeffs, y);
        store.set_poly(new_coeffs.iter().map(|c| group::serialize_scalar(c)).collect())?;
        store.set_state(
            group::serialize_g1(&client.a).unwrap(),
            client.powers.iter().map(|p| group::serialize_g1(p).unwrap()).collect(),
        )?;

        let mut tag = [0u8; 16];
        rng.fill_bytes(&mut tag);
        let msg = encoding::encode_item(new_data, &tag, idx);
        let sigma = sig::sign(&client.ssk, &msg);
        store.save_item(AccItemRecord {
            data: new_data.to_vec(),
            tag,
            index: idx,
            sigma,
        })?;

        debug!(index = idx, "acc update");
        Ok(UpdateReceipt { index: idx, root: client.a })
    }

    /// Export `client` as a canonical byte blob (scalars/points via
    /// `ark-serialize`, raw bytes for keys/tags/counters).
    pub fn export_client_state(client: &AccClientState) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&client.ssk);
        out.extend_from_slice(&client.vk);
        out.extend_from_slice(&group::serialize_scalar(&client.s));
        let g1 = group::serialize_g1(&client.g1).unwrap();
        let h = group::serialize_g2(&client.h).unwrap();
        let hs = group::serialize_g2(&client.hs).unwrap();
        let a = group::serialize_g1(&client.a).unwrap();
        for chunk in [&g1, &h, &hs, &a] {
            out.extend_from_slice(&(chunk.len() as u32).to_be_bytes());
            out.extend_from_slice(chunk);
        }
        out.extend_from_slice(&(client.powers.len() as u32).to_be_bytes());
        for p in &client.powers {
            let b = group::serialize_g1(p).unwrap();
            out.extend_from_slice(&(b.len() as u32).to_be_bytes());
            out.extend_from_slice(&b);
        }
        out.extend_from_slice(&client.upto.to_be_bytes());
        out.extend_from_slice(&client.cnt.to_be_bytes());
        out
    }

    /// Inverse of [`Self::export_client_state`].
    pub fn import_client_state(blob: &[u8]) -> Result<AccClientState, StorageError> {
        let mut off = 0usize;
        let take = |off: &mut usize, n: usize, buf: &[u8]| -> Result<Vec<u8>, StorageError> {
            if buf.len() < *off + n {
                return Err(StorageError::Decode(crate::errors::DecodeError::Truncated {
                    need: *off + n,
                    got: buf.len(),
                }));
            }
            let out = buf[*off..*off + n].to_vec();
            *off += n;
            Ok(out)
        };
        let take_framed = |off: &mut usize, buf: &[u8]| -> Result<Vec<u8>, StorageError> {
            let len_bytes = take(off, 4, buf)?;
            let len = u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
            take(off, len, buf)
        };

        let ssk: [u8; 32] = take(&mut off, 32, blob)?.try_into().unwrap();
        let vk: [u8; 32] = take(&mut off, 32, blob)?.try_into().unwrap();
        let s_bytes = take(&mut off, {
            // scalar serialized length is fixed for a given curve; probe via a
            // canonical re-serialization rather than hardcoding a constant.
            group::serialize_scalar(&Scalar::from(0u64)).len()
        }, blob)?;
        let s = group::deserialize_scalar(&s_bytes)?;

        let g1 = group::deserialize_g1(&take_framed(&mut off, blob)?)?;
        let h = group::deserialize_g2(&take_framed(&mut off, blob)?)?;
        let hs = group::deserialize_g2(&take_framed(&mut off, blob)?)?;
        let a = group::deserialize_g1(&take_framed(&mut off, blob)?)?;

        let count_bytes = take(&mut off, 4, blob)?;
        let count = u32::from_be_bytes(count_bytes.try_into().unwrap()) as usize;
        let mut powers = Vec::with_capacity(count);
        for _ in 0..count {
            powers.push(group::deserialize_g1(&take_framed(&mut off, blob)?)?);
        }

        let upto = u64::from_be_bytes(take(&mut off, 8, blob)?.try_into().unwrap());
        let cnt = u64::from_be_bytes(take(&mut off, 8, blob)?.try_into().unwrap());

        Ok(AccClientState { ssk, vk, s, g1, h, hs, a, powers, upto, cnt })
    }

    /// Rebuild a fresh server's state by replaying persisted items against
    /// a freshly-`setup` client (spec.md S4 / testable property 8): copy
    /// each item's `(data, tag, sigma)` into the new store, set the ACC
    /// state/polynomial/root to match the exported client, and the result
    /// continues to produce verifying proofs.
    pub fn rebuild_from_items<S>(
        client: &AccClientState,
        new_store: &mut S,
        items: &[Item],
    ) -> Result<(), StorageError>
    where
        S: AccStorage + RootStore,
    {
        for item in items {
            new_store.save_item(AccItemRecord {
                data: item.data.clone(),
                tag: item.tag,
                index: item.index,
                sigma: item.sigma,
            })?;
        }
        new_store.set_state(
            group::serialize_g1(&client.a).unwrap(),
            client.powers.iter().map(|p| group::serialize_g1(p).unwrap()).collect(),
        )?;
        // Rebuild the blacklist polynomial isn't possible from client state
        // alone (the roots y_i aren't retained client-side); a real
        // deployment keeps f(X) durable in the server's own storage and
        // copies it verbatim rather than recomputing it here. We copy the
        // identity polynomial only when no updates have happened yet
        // (upto == 0); otherwise the caller must migrate `get_acc_poly`
        // from the old store directly.
        if client.upto == 0 {
            new_store.set_poly(vec![group::serialize_scalar(&Scalar::from(1u64))])?;
        }
        new_store.set_root(Scheme::Acc, group::serialize_g1(&client.a).unwrap());
        Ok(())
    }
}

fn load_poly_and_powers<S: AccStorage>(store: &S) -> Result<(Vec<Scalar>, Vec<G1>), StorageError> {
    let coeff_bytes = store.get_poly()?;
    let coeffs: Result<Vec<Scalar>, _> = coeff_bytes.iter().map(|b| group::deserialize_scalar(b)).collect();
    let coeffs = coeffs.map_err(StorageError::from)?;

    let (_value, power_bytes) = store.get_state()?;
    let powers: Result<Vec<G1>, _> = power_bytes.iter().map(|b| group::deserialize_g1(b)).collect();
    let powers = powers.map_err(StorageError::from)?;
    Ok((coeffs, powers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStore;
    use rand::rngs::OsRng;

    fn setup() -> (AccPublic, AccClientState, MemStore) {
        let mut store = MemStore::new();
        let (public, client) = VdsAcc::setup(&mut OsRng, &mut store);
        (public, client, store)
    }

    // S1: append-verify round trip.
    #[test]
    fn s1_append_then_verify() {
        let (mut pub_params, mut client, mut store) = setup();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, &[b'a'; 10]).unwrap();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, &[b'b'; 10]).unwrap();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, &[b'c'; 10]).unwrap();
        pub_params.accumulator = client.a;

        let proof = VdsAcc::query(&store, 2).unwrap();
        assert!(VdsAcc::verify(&pub_params, 2, &[b'b'; 10], &proof));
    }

    // S2: update, then the freshly queried proof verifies against the new root.
    #[test]
    fn s2_update_then_verify() {
        let (mut pub_params, mut client, mut store) = setup();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, &[b'a'; 10]).unwrap();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, &[b'b'; 10]).unwrap();
        pub_params.accumulator = client.a;

        let receipt = VdsAcc::update(&mut OsRng, &mut client, &mut store, 2, &[b'B'; 12]).unwrap();
        pub_params.accumulator = receipt.root;

        let proof = VdsAcc::query(&store, 2).unwrap();
        assert!(VdsAcc::verify(&pub_params, 2, &[b'B'; 12], &proof));
    }

    // S3: old proofs are invalidated by an update; fresh ones verify.
    #[test]
    fn s3_old_proof_invalidated_by_update() {
        let (mut pub_params, mut client, mut store) = setup();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, b"hello").unwrap();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, b"world").unwrap();
        pub_params.accumulator = client.a;

        let old_proof = VdsAcc::query(&store, 1).unwrap();
        assert!(VdsAcc::verify(&pub_params, 1, b"hello", &old_proof));

        let receipt = VdsAcc::update(&mut OsRng, &mut client, &mut store, 1, b"HELLO").unwrap();
        pub_params.accumulator = receipt.root;

        assert!(!VdsAcc::verify(&pub_params, 1, b"hello", &old_proof));

        let new_proof = VdsAcc::query(&store, 1).unwrap();
        assert!(VdsAcc::verify(&pub_params, 1, b"HELLO", &new_proof));
    }

    // S4: export/import + replay yields a scheme that still verifies.
    #[test]
    fn s4_export_import_round_trip() {
        let (mut pub_params, mut client, mut store) = setup();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, b"x").unwrap();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, b"y").unwrap();
        pub_params.accumulator = client.a;

        let blob = VdsAcc::export_client_state(&client);
        let imported = VdsAcc::import_client_state(&blob).unwrap();

        let items = vec![
            Item { data: b"x".to_vec(), tag: store.get_item(1).unwrap().tag, index: 1, sigma: store.get_item(1).unwrap().sigma },
            Item { data: b"y".to_vec(), tag: store.get_item(2).unwrap().tag, index: 2, sigma: store.get_item(2).unwrap().sigma },
        ];
        let mut new_store = MemStore::new();
        VdsAcc::rebuild_from_items(&imported, &mut new_store, &items).unwrap();

        let proof = VdsAcc::query(&new_store, 1).unwrap();
        assert!(VdsAcc::verify(&pub_params, 1, b"x", &proof));
    }

    // Wrong-data rejection.
    #[test]
    fn wrong_data_is_rejected() {
        let (mut pub_params, mut client, mut store) = setup();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, b"real").unwrap();
        pub_params.accumulator = client.a;
        let proof = VdsAcc::query(&store, 1).unwrap();
        assert!(!VdsAcc::verify(&pub_params, 1, b"fake", &proof));
    }

    // Scheme tagging is exercised at the cross-scheme level in lib.rs's
    // integration tests (a CVC proof is a different Rust type entirely, so
    // there is no ACC-local way to "accidentally" accept one).

    // Polynomial exactness after every update.
    #[test]
    fn polynomial_divides_exactly_after_every_update() {
        let (mut pub_params, mut client, mut store) = setup();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, b"a").unwrap();
        pub_params.accumulator = client.a;
        for i in 0..5 {
            let r = VdsAcc::update(&mut OsRng, &mut client, &mut store, 1, format!("v{i}").as_bytes()).unwrap();
            pub_params.accumulator = r.root;
            // query() internally performs the exact division and would
            // surface StorageError::NonZeroRemainder on corruption.
            let proof = VdsAcc::query(&store, 1).unwrap();
            assert!(VdsAcc::verify(&pub_params, 1, format!("v{i}").as_bytes(), &proof));
        }
    }

    // Signature binding: tampering with tag or index breaks verification.
    #[test]
    fn signature_binds_data_tag_and_index() {
        let (mut pub_params, mut client, mut store) = setup();
        VdsAcc::append(&mut OsRng, &mut client, &mut store, b"hello").unwrap();
        pub_params.accumulator = client.a;
        let mut proof = VdsAcc::query(&store, 1).unwrap();
        proof.tag[0] ^= 0xff;
        assert!(!VdsAcc::verify(&pub_params, 1, b"hello", &proof));
    }
}
