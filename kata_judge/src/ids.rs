//! Short random identifiers.
//!
//! Tournament ids double as the bearer token mat displays use, and judge
//! access codes are typed by hand on tablets, so ids are short strings drawn
//! from a URL-safe alphabet rather than UUIDs.

use rand::Rng;

/// URL-safe alphabet (64 symbols)
pub const URL_ALPHABET: &[u8] = b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

/// Length of tournament ids
pub const TOURNAMENT_ID_LEN: usize = 6;
/// Length of judge registry ids
pub const JUDGE_ID_LEN: usize = 4;
/// Length of per-mat judge access codes
pub const JUDGE_CODE_LEN: usize = 4;
/// Length of athlete registry ids
pub const ATHLETE_ID_LEN: usize = 6;

/// Source of opaque unique-enough strings
pub trait IdGenerator: Send + Sync {
    /// Produce a random id of `len` characters
    fn generate(&self, len: usize) -> String;
}

/// Random ids over [`URL_ALPHABET`] using the thread RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct NanoId;

impl IdGenerator for NanoId {
    fn generate(&self, len: usize) -> String {
        let mut rng = rand::rng();
        (0..len)
            .map(|_| URL_ALPHABET[rng.random_range(0..URL_ALPHABET.len())] as char)
            .collect()
    }
}

/// Shorthand for `NanoId.generate(len)`
pub fn nanoid(len: usize) -> String {
    NanoId.generate(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_is_64_unique_symbols() {
        let unique: HashSet<_> = URL_ALPHABET.iter().collect();
        assert_eq!(URL_ALPHABET.len(), 64);
        assert_eq!(unique.len(), 64);
    }

    #[test]
    fn test_generated_length_and_charset() {
        for len in [0, JUDGE_CODE_LEN, TOURNAMENT_ID_LEN, 21] {
            let id = nanoid(len);
            assert_eq!(id.len(), len);
            assert!(id.bytes().all(|b| URL_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_ids_are_randomized() {
        let ids: HashSet<_> = (0..100).map(|_| nanoid(TOURNAMENT_ID_LEN)).collect();
        // 64^6 possibilities, a collision among 100 draws is practically impossible
        assert_eq!(ids.len(), 100);
    }
}
