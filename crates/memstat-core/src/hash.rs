//! Stable hashing helpers for interned symbols.

use blake3::Hasher;

/// 32-bit digest of a symbol's text. Stable across runs and platforms.
pub fn symbol_hash(s: &str) -> u32 {
    let mut h = Hasher::new();
    h.update(s.as_bytes());
    let out = h.finalize();
    let b = out.as_bytes();
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_hash_is_deterministic() {
        assert_eq!(symbol_hash("java/lang/String"), symbol_hash("java/lang/String"));
        assert_ne!(symbol_hash("indexOf"), symbol_hash("lastIndexOf"));
    }
}
