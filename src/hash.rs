use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::constants::hashing::INDEX_FINGERPRINT_SEED;
use crate::types::SampleIndex;

pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

/// Order-sensitive fingerprint of a split's index sequence.
pub fn index_fingerprint(indices: &[SampleIndex]) -> u64 {
    stable_hash_with(|hasher| {
        INDEX_FINGERPRINT_SEED.hash(hasher);
        indices.hash(hasher);
    })
}
