//! `VdsCvc`: the VDS-CVC logical API — `setup`/`append`/`query`/`verify`/
//! `update` — orchestrating `cvc::tree`'s per-node algebra, `sig`'s
//! signed-`h_i` bindings, and a caller-supplied [`CvcStorage`] +
//! [`RootStore`].
//!
//! There is no Python counterpart to crib control flow from here (both
//! `examples/original_source/vds/cvc/cvc_core.py` and `vds_cvc.py` are
//! unimplemented stubs) — the append/query/verify/update control flow below
//! follows spec.md §4.7's algorithm text directly, structured the way
//! `acc::engine` structures the analogous ACC flow.

#![forbid(unsafe_code)]

use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::cvc::tree::{self, NodeState};
use crate::cvc::{CvcBootstrap, CvcClientState, CvcParamsPk, CvcParamsSk, CvcProof, CvcPublic, CvcSegment};
use crate::errors::{StorageError, VerifyError};
use crate::group::{self, Scalar, G1};
use crate::sig;
use crate::storage::{CvcNodeRecord, CvcStorage, RootStore, Scheme};

/// Domain tag for a leaf's own data value (`m[0]`).
const CVC_DATA_TAG: &[u8] = b"CVC_DATA";
/// Domain tag for a child-pointer hash (`m[slot]` of the parent).
const CVC_PTR_TAG: &[u8] = b"CVC_PTR";

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

/// The VDS-CVC engine. Like `VdsAcc`, holds no storage of its own.
pub struct VdsCvc;

impl VdsCvc {
    /// Generate `(pk, sk, bootstrap)` for a `q`-ary tree and initialize the
    /// root node (idx 1) to its empty state. Returns `(client_state,)` —
    /// the public, verifier-facing view is `client.to_public()`.
    pub fn setup<R, S>(rng: &mut R, store: &mut S, q: usize) -> CvcClientState
    where
        R: RngCore + CryptoRng,
        S: CvcStorage + RootStore,
    {
        let g = group::g1_generator();
        let g2 = group::g2_generator();
        let (ssk, vk) = sig::keygen(rng);

        let mut trapdoors = Vec::with_capacity(q + 1);
        let mut h_list = Vec::with_capacity(q + 1);
        let mut h_list_g2 = Vec::with_capacity(q + 1);
        for _ in 0..=q {
            let z = group::random_scalar(rng);
            h_list.push(group::g1_mul(g, z));
            h_list_g2.push(group::g2_mul(g2, z));
            trapdoors.push(z);
        }

        let mut cross = std::collections::HashMap::new();
        for i in 1..=(q as u32 + 1) {
            for j in 1..=(q as u32 + 1) {
                if i == j {
                    continue;
                }
                let zij = trapdoors[(i - 1) as usize] * trapdoors[(j - 1) as usize];
                cross.insert((i, j), group::g1_mul(g, zij));
            }
        }

        let mut signed_hi = Vec::with_capacity(q + 1);
        for (i0, h_i) in h_list.iter().enumerate() {
            let msg = signed_base_message(h_i, (i0 + 1) as u32);
            let sig = sig::sign(&ssk, &msg);
            signed_hi.push((*h_i, sig));
        }

        let pk = CvcParamsPk { g, g2, signed_hi, q };
        let sk = CvcParamsSk { prf_key: { let mut k = [0u8; 32]; rng.fill_bytes(&mut k); k }, trapdoors, q };
        let bootstrap = CvcBootstrap { h_list, h_list_g2, cross, vk };

        let root_state = NodeState::fresh(g, tree::prf_scalar(&sk.prf_key, 1), q);
        let root = root_state.c;
        store.put_node(node_state_to_record(1, &root_state)).expect("fresh store accepts root node");
        store.set_root(Scheme::Cvc, group::serialize_g1(&root).unwrap());

        CvcClientState { pk, sk, bootstrap, root, cnt: 0 }
    }

    /// Append `data` at heap slot `cnt + 1`, propagating commitment deltas
    /// up to the root.
    pub fn append<S>(client: &mut CvcClientState, store: &mut S, data: &[u8]) -> Result<AppendReceipt, StorageError>
    where
        S: CvcStorage,
    {
        let idx = client.cnt + 1;
        let m_data = group::hash_to_scalar(CVC_DATA_TAG, data);
        let root = touch_leaf_and_propagate(&client.bootstrap, &client.sk, client.pk.q, store, idx, m_data)?;
        client.root = root;
        client.cnt = idx;
        debug!(index = idx, "cvc append");
        Ok(AppendReceipt { index: idx, root })
    }

    /// Assemble a query proof for `idx`: the leaf's own slot-1 opening plus
    /// one opening per ancestor on the path to the root.
    pub fn query<S>(pk: &CvcParamsPk, bootstrap: &CvcBootstrap, store: &S, idx: u64) -> Result<CvcProof, StorageError>
    where
        S: CvcStorage,
    {
        let leaf_record = store.get_node(idx)?.ok_or(StorageError::NodeNotFound(idx))?;
        let leaf_state = node_record_to_state(&leaf_record)?;
        let leaf_pi = tree::open_slot(&bootstrap.h_list, &bootstrap.cross, 1, leaf_state.r, &leaf_state.m);

        let mut segments = Vec::new();
        let mut cur = idx;
        while cur != 1 {
            let p = tree::parent(cur, pk.q);
            let s = tree::slot(cur, pk.q);
            let s_idx = tree::slot_idx(s);
            let parent_record = store.get_node(p)?.ok_or(StorageError::NodeNotFound(p))?;
            let parent_state = node_record_to_state(&parent_record)?;
            let proof = tree::open_slot(&bootstrap.h_list, &bootstrap.cross, s_idx, parent_state.r, &parent_state.m);
            segments.push(CvcSegment {
                node_commit: parent_state.c,
                proof,
                h: bootstrap.h_list[s_idx - 1],
                h_g2: bootstrap.h_list_g2[s_idx - 1],
                signed_hi: pk.signed_hi[s_idx - 1].1,
                slot: s_idx as u32,
            });
            cur = p;
        }

        Ok(CvcProof {
            leaf_commit: leaf_state.c,
            leaf_pi,
            leaf_h: bootstrap.h_list[0],
            leaf_h_g2: bootstrap.h_list_g2[0],
            leaf_signed_hi: pk.signed_hi[0].1,
            segments,
        })
    }

    /// Verify `proof` claims `data` is the current content at `idx` under
    /// `public`. Total: any failure returns `false`.
    pub fn verify(public: &CvcPublic, idx: u64, data: &[u8], proof: &CvcProof) -> bool {
        let ok = Self::verify_inner(public, idx, data, proof).unwrap_or(false);
        debug!(index = idx, ok, "cvc verify");
        ok
    }

    fn verify_inner(public: &CvcPublic, idx: u64, data: &[u8], proof: &CvcProof) -> Result<bool, VerifyError> {
        check_signed_base(&public.bootstrap.vk, &proof.leaf_h, 1, &proof.leaf_signed_hi)?;
        let m_leaf = group::hash_to_scalar(CVC_DATA_TAG, data);
        if !tree::verify_slot(proof.leaf_commit, proof.leaf_h, proof.leaf_h_g2, m_leaf, proof.leaf_pi, public.pk.g2) {
            return Err(VerifyError::PairingFailed);
        }

        // Recompute the expected path of (parent, child-slot) pairs from
        // `idx` itself, rather than trusting `proof.segments`'s own `slot`
        // fields: a proof's segment chain climbs to the root regardless of
        // which leaf it started from, so without this the same proof would
        // verify under any index sharing its ancestor chain.
        let mut expected_slots = Vec::new();
        let mut cur = idx;
        while cur != 1 {
            let p = tree::parent(cur, public.pk.q);
            expected_slots.push(tree::slot_idx(tree::slot(cur, public.pk.q)) as u32);
            cur = p;
        }
        if proof.segments.len() != expected_slots.len() {
            return Err(VerifyError::RootMismatch);
        }

        let mut cur_c = proof.leaf_commit;
        for (seg, &expected_slot) in proof.segments.iter().zip(expected_slots.iter()) {
            if seg.slot != expected_slot {
                return Err(VerifyError::RootMismatch);
            }
            check_signed_base(&public.bootstrap.vk, &seg.h, seg.slot, &seg.signed_hi)?;
            let m_ptr = group::hash_to_scalar(CVC_PTR_TAG, &group::serialize_g1(&cur_c).map_err(|_| VerifyError::PairingFailed)?);
            if !tree::verify_slot(seg.node_commit, seg.h, seg.h_g2, m_ptr, seg.proof, public.pk.g2) {
                return Err(VerifyError::PairingFailed);
            }
            cur_c = seg.node_commit;
        }

        let root_bytes = group::serialize_g1(&public.root).map_err(|_| VerifyError::PairingFailed)?;
        let top_bytes = group::serialize_g1(&cur_c).map_err(|_| VerifyError::PairingFailed)?;
        if root_bytes != top_bytes {
            return Err(VerifyError::RootMismatch);
        }
        Ok(true)
    }

    /// Replace the data at `idx` in place, propagating the new delta up to
    /// the root exactly as `append` does.
    pub fn update<S>(client: &mut CvcClientState, store: &mut S, idx: u64, new_data: &[u8]) -> Result<UpdateReceipt, StorageError>
    where
        S: CvcStorage,
    {
        if store.get_node(idx)?.is_none() {
            return Err(StorageError::NodeNotFound(idx));
        }
        let m_new = group::hash_to_scalar(CVC_DATA_TAG, new_data);
        let root = touch_leaf_and_propagate(&client.bootstrap, &client.sk, client.pk.q, store, idx, m_new)?;
        client.root = root;
        debug!(index = idx, "cvc update");
        Ok(UpdateReceipt { index: idx, root })
    }
}

/// Set `node[idx].m[0] = new_m0` (creating the node if absent), then walk
/// upward recomputing every ancestor's slot-pointer delta — shared by
/// `append` (node absent or `m[0] == 0`) and `update` (node present,
/// `m[0]` already non-zero): spec.md §4.7 describes both via the same
/// delta-based recurrence.
fn touch_leaf_and_propagate<S: CvcStorage>(
    bootstrap: &CvcBootstrap,
    sk: &CvcParamsSk,
    q: usize,
    store: &mut S,
    idx: u64,
    new_m0: Scalar,
) -> Result<G1, StorageError> {
    let mut state = match store.get_node(idx)? {
        Some(record) => node_record_to_state(&record)?,
        None => NodeState::fresh(group::g1_generator(), tree::prf_scalar(&sk.prf_key, idx), q),
    };
    let delta = new_m0 - state.m[0];
    state.c = group::g1_add(state.c, group::g1_mul(bootstrap.h_list[0], delta));
    state.m[0] = new_m0;
    store.put_node(node_state_to_record(idx, &state))?;

    let mut cur = idx;
    let mut cur_c = state.c;
    while cur != 1 {
        let p = tree::parent(cur, q);
        let s = tree::slot(cur, q);
        let s_idx = tree::slot_idx(s);
        let mut parent_state = match store.get_node(p)? {
            Some(record) => node_record_to_state(&record)?,
            None => NodeState::fresh(group::g1_generator(), tree::prf_scalar(&sk.prf_key, p), q),
        };
        let m_ptr = group::hash_to_scalar(CVC_PTR_TAG, &group::serialize_g1(&cur_c)?);
        let delta = m_ptr - parent_state.m[s_idx - 1];
        parent_state.c = group::g1_add(parent_state.c, group::g1_mul(bootstrap.h_list[s_idx - 1], delta));
        parent_state.m[s_idx - 1] = m_ptr;
        store.put_node(node_state_to_record(p, &parent_state))?;
        cur = p;
        cur_c = parent_state.c;
    }
    Ok(cur_c)
}

fn node_state_to_record(idx: u64, state: &NodeState) -> CvcNodeRecord {
    CvcNodeRecord {
        idx,
        r: group::serialize_scalar(&state.r),
        m: state.m.iter().map(group::serialize_scalar).collect(),
        c: group::serialize_g1(&state.c).expect("G1 serialization is infallible"),
    }
}

fn node_record_to_state(record: &CvcNodeRecord) -> Result<NodeState, StorageError> {
    let r = group::deserialize_scalar(&record.r)?;
    let m: Result<Vec<Scalar>, _> = record.m.iter().map(|b| group::deserialize_scalar(b)).collect();
    let m = m.map_err(StorageError::from)?;
    let c = group::deserialize_g1(&record.c)?;
    Ok(NodeState { r, m, c })
}

fn signed_base_message(h_i: &G1, slot: u32) -> Vec<u8> {
    let mut msg = group::serialize_g1(h_i).expect("G1 serialization is infallible");
    msg.extend_from_slice(&slot.to_be_bytes());
    msg
}

fn check_signed_base(vk: &[u8; 32], h: &G1, slot: u32, signature: &[u8; 64]) -> Result<(), VerifyError> {
    let msg = signed_base_message(h, slot);
    if sig::verify(vk, &msg, signature) {
        Ok(())
    } else {
        Err(VerifyError::BadSignedBase(slot))
    }
}
