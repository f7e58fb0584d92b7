use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::constants::roles::{EVAL_ROLE, TRAIN_ROLE};
use crate::errors::ConfigError;
use crate::labels::{Label, LabelHierarchy};

pub use crate::types::{ClassId, DatasetName, DomainRole, SampleIndex, TransformId};

/// Which transform family a split view is served with.
///
/// Both roles cover the same samples; only the transform differs.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Training transform (augmentation).
    Train,
    /// Evaluation transform (deterministic preprocessing).
    Eval,
}

impl Role {
    /// Canonical role order.
    pub const ALL: [Role; 2] = [Role::Train, Role::Eval];

    /// Lowercase role label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Train => TRAIN_ROLE,
            Role::Eval => EVAL_ROLE,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indexed, labeled base dataset.
///
/// `label_at` must return the same label for the same index for the lifetime
/// of the dataset; split construction relies on it being stable.
pub trait LabeledDataset: Send + Sync {
    /// Stable dataset identifier used in logs and error messages.
    fn id(&self) -> &str;
    /// Number of samples.
    fn len(&self) -> usize;
    /// Label of the sample at `idx`, or `None` when out of range.
    fn label_at(&self, idx: SampleIndex) -> Option<&Label>;
    /// True when the dataset holds no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Base datasets keyed by domain role, in caller order.
pub type DomainDatasets = IndexMap<DomainRole, Arc<dyn LabeledDataset>>;
/// Domain dictionaries keyed by role, in caller order.
pub type RoleDatasets = IndexMap<Role, DomainDatasets>;

/// Dataset backed by an in-memory label vector.
#[derive(Clone, Debug)]
pub struct InMemoryDataset {
    id: DatasetName,
    labels: Vec<Label>,
}

impl InMemoryDataset {
    /// Create a dataset from prebuilt labels.
    pub fn new(id: impl Into<DatasetName>, labels: Vec<Label>) -> Self {
        Self {
            id: id.into(),
            labels,
        }
    }

    /// Create a dataset of single-level labels.
    pub fn from_classes(id: impl Into<DatasetName>, classes: &[ClassId]) -> Self {
        Self::new(id, classes.iter().copied().map(Label::flat).collect())
    }
}

impl LabeledDataset for InMemoryDataset {
    fn id(&self) -> &str {
        &self.id
    }

    fn len(&self) -> usize {
        self.labels.len()
    }

    fn label_at(&self, idx: SampleIndex) -> Option<&Label> {
        self.labels.get(idx)
    }
}

/// Ordered view over selected samples of a parent dataset.
#[derive(Clone)]
pub struct SubsetDataset {
    parent: Arc<dyn LabeledDataset>,
    domain: DomainRole,
    indices: Vec<SampleIndex>,
    transform: Option<TransformId>,
}

impl fmt::Debug for SubsetDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubsetDataset")
            .field("parent", &self.parent.id())
            .field("domain", &self.domain)
            .field("len", &self.indices.len())
            .field("transform", &self.transform)
            .finish()
    }
}

impl SubsetDataset {
    /// Create a view over `indices` of `parent`.
    ///
    /// Every index must be in range for the parent.
    pub fn new(
        parent: Arc<dyn LabeledDataset>,
        domain: impl Into<DomainRole>,
        indices: Vec<SampleIndex>,
    ) -> Result<Self, ConfigError> {
        let len = parent.len();
        if let Some(&index) = indices.iter().find(|&&idx| idx >= len) {
            return Err(ConfigError::SampleOutOfRange {
                dataset: parent.id().to_string(),
                index,
            });
        }
        Ok(Self {
            parent,
            domain: domain.into(),
            indices,
            transform: None,
        })
    }

    /// Attach the transform identifier this view is served with.
    pub fn with_transform(mut self, transform: Option<TransformId>) -> Self {
        self.transform = transform;
        self
    }

    /// Base dataset the indices point into.
    pub fn parent(&self) -> &Arc<dyn LabeledDataset> {
        &self.parent
    }

    /// Domain role the samples were drawn from.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Parent-relative sample indices, in split order.
    pub fn indices(&self) -> &[SampleIndex] {
        &self.indices
    }

    /// Transform identifier this view is served with, if any.
    pub fn transform(&self) -> Option<&str> {
        self.transform.as_deref()
    }

    /// Number of samples in the view.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the view selects no samples.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw labels of the contained samples, in split order.
    ///
    /// Fails if the parent no longer answers for one of the indices.
    pub fn labels(&self) -> Result<Vec<&Label>, ConfigError> {
        self.indices
            .iter()
            .map(|&idx| {
                self.parent
                    .label_at(idx)
                    .ok_or_else(|| ConfigError::SampleOutOfRange {
                        dataset: self.parent.id().to_string(),
                        index: idx,
                    })
            })
            .collect()
    }

    /// Distinct class values at `level` among the contained samples.
    pub fn classes_at(
        &self,
        hierarchy: &dyn LabelHierarchy,
        level: usize,
    ) -> Result<BTreeSet<ClassId>, ConfigError> {
        self.indices
            .iter()
            .map(|&idx| class_of(self.parent.as_ref(), hierarchy, idx, level))
            .collect()
    }
}

/// Class of sample `idx` of `dataset` at `level`.
pub fn class_of(
    dataset: &dyn LabeledDataset,
    hierarchy: &dyn LabelHierarchy,
    idx: SampleIndex,
    level: usize,
) -> Result<ClassId, ConfigError> {
    let label = dataset
        .label_at(idx)
        .ok_or_else(|| ConfigError::SampleOutOfRange {
            dataset: dataset.id().to_string(),
            index: idx,
        })?;
    hierarchy
        .label_at_level(label, level)
        .ok_or_else(|| ConfigError::MissingHierarchyLevel {
            dataset: dataset.id().to_string(),
            index: idx,
            level,
        })
}

/// Handle to a subset owned by a `DatasetArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DatasetId(usize);

/// Append-only owner of every subset referenced by split schemes.
#[derive(Clone, Debug, Default)]
pub struct DatasetArena {
    subsets: Vec<SubsetDataset>,
}

impl DatasetArena {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `subset` and return its handle.
    pub fn alloc(&mut self, subset: SubsetDataset) -> DatasetId {
        self.subsets.push(subset);
        DatasetId(self.subsets.len() - 1)
    }

    /// Subset behind `id`, or `None` for a handle from another arena.
    pub fn get(&self, id: DatasetId) -> Option<&SubsetDataset> {
        self.subsets.get(id.0)
    }

    /// Number of subsets owned.
    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    /// True before the first allocation.
    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }
}
