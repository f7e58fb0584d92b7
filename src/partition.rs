//! Single-scheme partitioning.
//!
//! A `SchemePartitioner` turns one domain dictionary into the named splits of
//! one scheme. The manager calls it once per (partition index, role) and never
//! inspects how classes were allocated; it only re-checks the result.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::constants::domains::TARGET_DOMAIN;
use crate::constants::naming::{NAME_SEPARATOR, PARTITIONS_MARKER, TEST_PREFIX};
use crate::constants::splits::{TEST_SPLIT, TRAIN_SUFFIX, VAL_SUFFIX};
use crate::data::{DomainDatasets, SubsetDataset, class_of};
use crate::errors::{ConfigError, SplitError};
use crate::labels::{ColumnHierarchy, LabelHierarchy};
use crate::types::{ClassId, DomainRole, SampleIndex, SchemeName, SplitName};

/// Parameters for building one scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartitionRequest {
    /// Which training partition this scheme holds out.
    pub partition_index: usize,
    /// Number of chunks the training classes are dealt into.
    pub num_training_partitions: usize,
    /// Samples in the test window.
    pub test_size: usize,
    /// First test sample in the test domain.
    pub test_start_idx: usize,
    /// Level at which classes are resolved.
    pub hierarchy_level: usize,
}

/// Splits of one role group, keyed by split name in partitioner order.
pub type SplitDatasets = IndexMap<SplitName, SubsetDataset>;

/// Builds the splits of one scheme from a domain dictionary.
///
/// Output must be deterministic for identical inputs, and the classes of the
/// returned splits must be pairwise disjoint at `request.hierarchy_level`.
pub trait SchemePartitioner {
    /// Named splits of one role group for `request.partition_index`.
    fn build(
        &self,
        datasets: &DomainDatasets,
        request: &PartitionRequest,
    ) -> Result<SplitDatasets, SplitError>;
}

/// Deterministic scheme name, e.g. `test0_10_partitions2_1`.
pub fn scheme_name(
    test_size: usize,
    test_start_idx: usize,
    num_training_partitions: usize,
    partition_index: usize,
) -> SchemeName {
    format!(
        "{TEST_PREFIX}{test_start_idx}{NAME_SEPARATOR}{test_size}{NAME_SEPARATOR}\
         {PARTITIONS_MARKER}{num_training_partitions}{NAME_SEPARATOR}{partition_index}"
    )
}

/// Class-disjoint partitioner used by default.
///
/// The test split is the window `test_start_idx..test_start_idx + test_size`
/// of the test domain. Classes seen in that window are removed from every
/// domain. Each domain's remaining classes, in ascending order, are dealt
/// round-robin into `num_training_partitions` chunks; chunk
/// `partition_index % num_training_partitions` becomes `{domain}_val` and the
/// rest `{domain}_train`.
#[derive(Clone)]
pub struct ClassDisjointPartitioner {
    test_domain: DomainRole,
    hierarchy: Arc<dyn LabelHierarchy>,
}

impl Default for ClassDisjointPartitioner {
    fn default() -> Self {
        Self::new(TARGET_DOMAIN)
    }
}

impl ClassDisjointPartitioner {
    /// Partitioner drawing the test split from `test_domain`.
    pub fn new(test_domain: impl Into<DomainRole>) -> Self {
        Self {
            test_domain: test_domain.into(),
            hierarchy: Arc::new(ColumnHierarchy),
        }
    }

    /// Replace the label accessor used to resolve classes.
    pub fn with_hierarchy(mut self, hierarchy: Arc<dyn LabelHierarchy>) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    /// Domain role the test window is drawn from.
    pub fn test_domain(&self) -> &str {
        &self.test_domain
    }
}

impl SchemePartitioner for ClassDisjointPartitioner {
    fn build(
        &self,
        datasets: &DomainDatasets,
        request: &PartitionRequest,
    ) -> Result<SplitDatasets, SplitError> {
        let partitions = request.num_training_partitions;
        if partitions < 2 {
            return Err(ConfigError::InvalidParameter {
                name: "num_training_partitions",
                reason: format!("class-disjoint validation needs at least 2, got {partitions}"),
            }
            .into());
        }
        let level = request.hierarchy_level;
        let hierarchy = self.hierarchy.as_ref();

        let test_parent = datasets
            .get(&self.test_domain)
            .ok_or_else(|| ConfigError::MissingDomain(self.test_domain.clone()))?;
        let start = request.test_start_idx;
        let end = start
            .checked_add(request.test_size)
            .filter(|&end| end <= test_parent.len())
            .ok_or_else(|| ConfigError::InvalidParameter {
                name: "test_size",
                reason: format!(
                    "test window starting at {start} with {} samples exceeds '{}' ({} samples)",
                    request.test_size,
                    test_parent.id(),
                    test_parent.len()
                ),
            })?;
        let test_indices: Vec<SampleIndex> = (start..end).collect();
        let test_classes = test_indices
            .iter()
            .map(|&idx| class_of(test_parent.as_ref(), hierarchy, idx, level))
            .collect::<Result<BTreeSet<ClassId>, _>>()?;

        let mut splits = SplitDatasets::new();
        for (domain, dataset) in datasets {
            let classes = (0..dataset.len())
                .map(|idx| class_of(dataset.as_ref(), hierarchy, idx, level))
                .collect::<Result<Vec<ClassId>, _>>()?;
            let training: Vec<ClassId> = classes
                .iter()
                .copied()
                .filter(|class| !test_classes.contains(class))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            if training.len() < partitions {
                return Err(ConfigError::InvalidParameter {
                    name: "num_training_partitions",
                    reason: format!(
                        "domain '{domain}' has {} training classes, fewer than {partitions} partitions",
                        training.len()
                    ),
                }
                .into());
            }

            let val_chunk = request.partition_index % partitions;
            let val_classes: BTreeSet<ClassId> = training
                .iter()
                .enumerate()
                .filter(|(pos, _)| pos % partitions == val_chunk)
                .map(|(_, class)| *class)
                .collect();

            let mut train_indices = Vec::new();
            let mut val_indices = Vec::new();
            for (idx, class) in classes.iter().enumerate() {
                if test_classes.contains(class) {
                    continue;
                }
                if val_classes.contains(class) {
                    val_indices.push(idx);
                } else {
                    train_indices.push(idx);
                }
            }

            splits.insert(
                format!("{domain}{TRAIN_SUFFIX}"),
                SubsetDataset::new(dataset.clone(), domain.clone(), train_indices)?,
            );
            splits.insert(
                format!("{domain}{VAL_SUFFIX}"),
                SubsetDataset::new(dataset.clone(), domain.clone(), val_indices)?,
            );
        }
        splits.insert(
            TEST_SPLIT.to_string(),
            SubsetDataset::new(test_parent.clone(), self.test_domain.clone(), test_indices)?,
        );
        Ok(splits)
    }
}
