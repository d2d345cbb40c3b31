use ring::digest::{Context, SHA256};

use crate::error::{LedgerError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Length in bytes of a SHA-256 digest
pub const DIGEST_LEN: usize = 32;

/// Wall-clock milliseconds since the Unix epoch, rendered as a decimal string.
///
/// Blocks treat the timestamp as an opaque marker, so the string form is what gets hashed.
pub fn current_timestamp() -> Result<String> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LedgerError::Io(format!("System time error: {e}")))?
        .as_millis();

    Ok(duration.to_string())
}

pub fn sha256_digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(digest.as_ref());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::HEXLOWER;

    #[test]
    fn test_sha256_known_vector() {
        let digest = sha256_digest(b"abc");
        assert_eq!(
            HEXLOWER.encode(&digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_current_timestamp_is_decimal() {
        let ts = current_timestamp().unwrap();
        assert!(!ts.is_empty());
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
    }
}
