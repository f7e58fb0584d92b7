use serde::{Deserialize, Serialize};

use crate::constants::config::{
    DEFAULT_NUM_TRAINING_PARTITIONS, DEFAULT_NUM_TRAINING_SETS, DEFAULT_TEST_SIZE,
};
use crate::data::Role;
use crate::errors::ConfigError;
use crate::types::TransformId;

/// Parameters fixed for the lifetime of a `SplitSchemeManager`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Transform identifier attached to every `train`-role split (opaque).
    pub train_transform: Option<TransformId>,
    /// Transform identifier attached to every `eval`-role split (opaque).
    pub eval_transform: Option<TransformId>,
    /// Number of samples in the held-out test window.
    pub test_size: usize,
    /// Position of the first test sample in the test domain.
    pub test_start_idx: usize,
    /// Number of disjoint class chunks the training classes are dealt into.
    pub num_training_partitions: usize,
    /// Number of schemes built; scheme `p` uses partition index `p`.
    pub num_training_sets: usize,
    /// Label hierarchy level used for class disjointness.
    pub hierarchy_level: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_transform: None,
            eval_transform: None,
            test_size: DEFAULT_TEST_SIZE,
            test_start_idx: 0,
            num_training_partitions: DEFAULT_NUM_TRAINING_PARTITIONS,
            num_training_sets: DEFAULT_NUM_TRAINING_SETS,
            hierarchy_level: 0,
        }
    }
}

impl SplitConfig {
    /// Reject parameter combinations that cannot produce a scheme.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.test_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "test_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.num_training_partitions == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_training_partitions",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.num_training_sets == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_training_sets",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }

    /// Transform configured for `role`.
    pub fn transform_for(&self, role: Role) -> Option<&TransformId> {
        match role {
            Role::Train => self.train_transform.as_ref(),
            Role::Eval => self.eval_transform.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SplitConfig::default().validated().unwrap();
        assert_eq!(config.num_training_partitions, 2);
        assert_eq!(config.num_training_sets, 1);
        assert_eq!(config.hierarchy_level, 0);
    }

    #[test]
    fn zero_counts_are_rejected() {
        for (config, field) in [
            (
                SplitConfig {
                    test_size: 0,
                    ..SplitConfig::default()
                },
                "test_size",
            ),
            (
                SplitConfig {
                    num_training_partitions: 0,
                    ..SplitConfig::default()
                },
                "num_training_partitions",
            ),
            (
                SplitConfig {
                    num_training_sets: 0,
                    ..SplitConfig::default()
                },
                "num_training_sets",
            ),
        ] {
            let err = config.validated().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidParameter { name, .. } if name == field));
        }
    }

    #[test]
    fn transform_lookup_follows_role() {
        let config = SplitConfig {
            train_transform: Some("augment".into()),
            eval_transform: Some("center_crop".into()),
            ..SplitConfig::default()
        };
        assert_eq!(config.transform_for(Role::Train).map(String::as_str), Some("augment"));
        assert_eq!(config.transform_for(Role::Eval).map(String::as_str), Some("center_crop"));
    }
}
