/// Split names and suffixes produced by the built-in partitioner.
pub mod splits {
    /// Name of the held-out split shared by every scheme.
    pub const TEST_SPLIT: &str = "test";
    /// Suffix appended to a domain role for its training split.
    pub const TRAIN_SUFFIX: &str = "_train";
    /// Suffix appended to a domain role for its validation split.
    pub const VAL_SUFFIX: &str = "_val";
}

/// Domain role keys used by default configurations.
pub mod domains {
    /// Conventional key for the labeled source domain.
    pub const SOURCE_DOMAIN: &str = "src";
    /// Conventional key for the target domain; supplies the test split by default.
    pub const TARGET_DOMAIN: &str = "target";
}

/// Role labels as they appear in names, logs, and manifests.
pub mod roles {
    /// Label of the training-transform role.
    pub const TRAIN_ROLE: &str = "train";
    /// Label of the evaluation-transform role.
    pub const EVAL_ROLE: &str = "eval";
}

/// Pieces of the deterministic scheme naming pattern.
pub mod naming {
    /// Prefix preceding the test window description.
    pub const TEST_PREFIX: &str = "test";
    /// Marker preceding the partition count.
    pub const PARTITIONS_MARKER: &str = "partitions";
    /// Separator between name components.
    pub const NAME_SEPARATOR: &str = "_";
}

/// Defaults applied by `SplitConfig::default`.
pub mod config {
    /// Default number of samples in the test window.
    pub const DEFAULT_TEST_SIZE: usize = 10;
    /// Default number of disjoint training partitions.
    pub const DEFAULT_NUM_TRAINING_PARTITIONS: usize = 2;
    /// Default number of schemes constructed.
    pub const DEFAULT_NUM_TRAINING_SETS: usize = 1;
}

/// Seeds used by hashing helpers.
pub mod hashing {
    /// Seed mixed into split index fingerprints.
    pub const INDEX_FINGERPRINT_SEED: u64 = 0x5A17_5EED;
}
