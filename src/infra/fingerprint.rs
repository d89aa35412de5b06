use sha2::{Digest, Sha256};

use crate::app::ports::FingerprintPort;

/// Fingerprinter taking the leading 64 bits of a sha256 digest. Identical
/// bytes always map to the same value, which is all the near-duplicate
/// grouping requires.
pub struct Sha256Fingerprinter;

impl FingerprintPort for Sha256Fingerprinter {
    fn fingerprint(&self, content: &[u8]) -> u64 {
        let digest = Sha256::digest(content);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(prefix)
    }
}
