//! Content addressing for blocks
//!
//! A block's hash is SHA-256 over the concatenation of the decimal index, the
//! timestamp string, the raw payload bytes, the raw previous hash and the
//! decimal nonce. No separators are inserted.

use crate::utils::{sha256_digest, DIGEST_LEN};

/// Hash the canonical encoding of a block's fields.
pub fn calculate_hash(
    index: u64,
    timestamp: &str,
    payload: &[u8],
    previous_hash: &[u8],
    nonce: u64,
) -> [u8; DIGEST_LEN] {
    sha256_digest(&canonical_bytes(index, timestamp, payload, previous_hash, nonce))
}

fn canonical_bytes(
    index: u64,
    timestamp: &str,
    payload: &[u8],
    previous_hash: &[u8],
    nonce: u64,
) -> Vec<u8> {
    let index = index.to_string();
    let nonce = nonce.to_string();
    let mut data = Vec::with_capacity(
        index.len() + timestamp.len() + payload.len() + previous_hash.len() + nonce.len(),
    );
    data.extend(index.as_bytes());
    data.extend(timestamp.as_bytes());
    data.extend(payload);
    data.extend(previous_hash);
    data.extend(nonce.as_bytes());
    data
}

/// True when `hash` starts with at least `difficulty` zero bytes.
///
/// Difficulty counts whole bytes, not hex nibbles: difficulty 2 means the hex
/// form starts with `0000`. A difficulty larger than the hash never matches.
pub fn meets_difficulty(hash: &[u8], difficulty: u32) -> bool {
    let required = difficulty as usize;
    hash.len() >= required && hash[..required].iter().all(|b| *b == 0)
}
