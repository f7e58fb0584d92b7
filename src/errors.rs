use thiserror::Error;

use crate::data::Role;
use crate::types::{ClassId, DomainRole, SampleIndex, SchemeName, SplitName};

/// Top-level error for scheme construction and queries.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Bad parameters or an unknown name.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    /// A consistency check rejected the constructed schemes.
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl SplitError {
    /// True for malformed parameters and unknown names.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SplitError::Configuration(_))
    }

    /// True when a cross-scheme consistency check failed.
    pub fn is_invariant(&self) -> bool {
        matches!(self, SplitError::Invariant(_))
    }
}

/// Malformed or missing parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A parameter value cannot produce a scheme.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name as spelled in `SplitConfig` or the partitioner.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// No scheme was constructed under this name.
    #[error("unknown split scheme '{0}'")]
    UnknownScheme(SchemeName),
    /// A query ran before `select_scheme`.
    #[error("no split scheme selected")]
    NoCurrentScheme,
    /// The current scheme has no group for this role.
    #[error("scheme '{scheme}' has no '{role}' role")]
    UnknownRole {
        /// Scheme that was queried.
        scheme: SchemeName,
        /// Missing role.
        role: Role,
    },
    /// The role group has no split under this name.
    #[error("scheme '{scheme}' has no split '{split}' under role '{role}'")]
    UnknownSplit {
        /// Scheme that was queried.
        scheme: SchemeName,
        /// Role group that was queried.
        role: Role,
        /// Missing split name.
        split: SplitName,
    },
    /// A scheme entry holds a handle the arena never allocated.
    #[error("scheme '{scheme}' split '{split}' under role '{role}' points outside the dataset arena")]
    DanglingDataset {
        /// Scheme holding the handle.
        scheme: SchemeName,
        /// Role group holding the handle.
        role: Role,
        /// Split holding the handle.
        split: SplitName,
    },
    /// A partitioner needed a domain the dictionary lacks.
    #[error("domain '{0}' is missing from the dataset dictionary")]
    MissingDomain(DomainRole),
    /// An index points past the end of its dataset.
    #[error("dataset '{dataset}' has no sample at index {index}")]
    SampleOutOfRange {
        /// Dataset identifier.
        dataset: String,
        /// Offending index.
        index: SampleIndex,
    },
    /// The label accessor has no value at the configured level.
    #[error("label of sample {index} in '{dataset}' has no hierarchy level {level}")]
    MissingHierarchyLevel {
        /// Dataset identifier.
        dataset: String,
        /// Sample whose label lacks the level.
        index: SampleIndex,
        /// Requested hierarchy level.
        level: usize,
    },
}

/// First failing detail reported by a cross-scheme check.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Two splits of one role group share classes.
    #[error(
        "scheme '{scheme}' role '{role}': splits '{left}' and '{right}' share classes {classes:?}"
    )]
    ClassOverlap {
        /// Scheme containing both splits.
        scheme: SchemeName,
        /// Role group containing both splits.
        role: Role,
        /// Earlier split in scheme order.
        left: SplitName,
        /// Later split in scheme order.
        right: SplitName,
        /// Shared classes, ascending.
        classes: Vec<ClassId>,
    },
    /// A role group lacks a split every group must carry.
    #[error("scheme '{scheme}' role '{role}' has no '{split}' split")]
    MissingSplit {
        /// Scheme lacking the split.
        scheme: SchemeName,
        /// Role group lacking the split.
        role: Role,
        /// Required split name.
        split: SplitName,
    },
    /// A test split differs from the first one seen.
    #[error(
        "test split of scheme '{scheme}' role '{role}' differs from scheme '{reference_scheme}' \
         role '{reference_role}' at position {position} (expected {expected:?}, found {found:?})"
    )]
    TestSetMismatch {
        /// Scheme whose test split every other one is compared with.
        reference_scheme: SchemeName,
        /// Role group of the reference test split.
        reference_role: Role,
        /// Scheme whose test split differs.
        scheme: SchemeName,
        /// Role group whose test split differs.
        role: Role,
        /// First differing position.
        position: usize,
        /// Reference index at `position`, `None` past its end.
        expected: Option<SampleIndex>,
        /// Differing index at `position`, `None` past its end.
        found: Option<SampleIndex>,
    },
    /// One split covers different samples under two roles.
    #[error(
        "scheme '{scheme}' split '{split}' differs between roles '{left_role}' and '{right_role}' \
         at position {position} (expected {expected:?}, found {found:?})"
    )]
    RoleIndexMismatch {
        /// Scheme containing the split.
        scheme: SchemeName,
        /// Split present under both roles.
        split: SplitName,
        /// First role holding the split.
        left_role: Role,
        /// Role whose view differs.
        right_role: Role,
        /// First differing position.
        position: usize,
        /// Index under `left_role`, `None` past its end.
        expected: Option<SampleIndex>,
        /// Index under `right_role`, `None` past its end.
        found: Option<SampleIndex>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_error_classifies_both_kinds() {
        let config: SplitError = ConfigError::NoCurrentScheme.into();
        assert!(config.is_configuration());
        assert!(!config.is_invariant());

        let invariant: SplitError = InvariantViolation::MissingSplit {
            scheme: "s".into(),
            role: Role::Eval,
            split: "test".into(),
        }
        .into();
        assert!(invariant.is_invariant());
        assert!(invariant.to_string().contains("has no 'test' split"));
    }

    #[test]
    fn overlap_message_names_classes_and_splits() {
        let err = InvariantViolation::ClassOverlap {
            scheme: "test0_10_partitions2_0".into(),
            role: Role::Train,
            left: "src_train".into(),
            right: "test".into(),
            classes: vec![3, 7],
        };
        let text = err.to_string();
        assert!(text.contains("src_train"));
        assert!(text.contains("[3, 7]"));
        assert!(text.contains("role 'train'"));
    }
}
