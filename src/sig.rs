//! Ed25519-style detached signature layer.
//!
//! `keygen`/`sign`/`verify` exactly as spec.md §4.3: 32-byte keys, a 64-byte
//! detached signature, and a `verify` that never panics — any malformed
//! key, wrong length, or forged signature collapses to `false`.

#![forbid(unsafe_code)]

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;

/// `(signing_key_bytes, verifying_key_bytes)`, 32 bytes each.
pub fn keygen<R: RngCore + rand::CryptoRng>(rng: &mut R) -> ([u8; 32], [u8; 32]) {
    let signing_key = SigningKey::generate(rng);
    let verifying_key = signing_key.verifying_key();
    (signing_key.to_bytes(), verifying_key.to_bytes())
}

/// Sign `msg` with a 32-byte raw signing key, producing a 64-byte detached
/// signature.
pub fn sign(sk_bytes: &[u8; 32], msg: &[u8]) -> [u8; 64] {
    let signing_key = SigningKey::from_bytes(sk_bytes);
    signing_key.sign(msg).to_bytes()
}

/// Verify a detached signature. Any malformed key, malformed signature, or
/// forgery returns `false` — this function never panics and never raises.
pub fn verify(vk_bytes: &[u8; 32], msg: &[u8], sig_bytes: &[u8; 64]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(vk_bytes) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(sig_bytes);
    verifying_key.verify(msg, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn sign_then_verify_round_trips() {
        let (sk, vk) = keygen(&mut OsRng);
        let msg = b"verifiable data streaming";
        let sig = sign(&sk, msg);
        assert!(verify(&vk, msg, &sig));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let (sk, vk) = keygen(&mut OsRng);
        let sig = sign(&sk, b"abc");
        assert!(!verify(&vk, b"abc!", &sig));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let (sk, _vk) = keygen(&mut OsRng);
        let (_sk2, vk2) = keygen(&mut OsRng);
        let msg = b"message";
        let sig = sign(&sk, msg);
        assert!(!verify(&vk2, msg, &sig));
    }

    #[test]
    fn verify_rejects_malformed_key_without_panicking() {
        let bad_vk = [0xffu8; 32];
        assert!(!verify(&bad_vk, b"m", &[0u8; 64]));
    }
}
