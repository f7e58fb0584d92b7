#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Split-scheme configuration.
pub mod config;
/// Centralized constants used across partitioning, naming, and defaults.
pub mod constants;
/// Base datasets, subset views, and the dataset arena.
pub mod data;
/// Reusable demo runners shared by the demo binaries.
pub mod example_apps;
mod hash;
/// Cross-scheme consistency checks.
pub mod invariants;
/// Hierarchical labels and level accessors.
pub mod labels;
/// Serializable scheme snapshots.
pub mod manifest;
/// Per-split summary statistics.
pub mod metrics;
/// Single-scheme partitioners and scheme naming.
pub mod partition;
/// Split schemes and the scheme manager.
pub mod splits;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::SplitConfig;
pub use data::{
    DatasetArena, DatasetId, DomainDatasets, InMemoryDataset, LabeledDataset, Role, RoleDatasets,
    SubsetDataset,
};
pub use errors::{ConfigError, InvariantViolation, SplitError};
pub use labels::{ColumnHierarchy, Label, LabelHierarchy};
pub use manifest::{SchemeManifest, SplitEntry};
pub use metrics::SplitSummary;
pub use partition::{
    ClassDisjointPartitioner, PartitionRequest, SchemePartitioner, SplitDatasets, scheme_name,
};
pub use splits::{
    DatasetAccess, NullObserver, SchemeMap, SplitObserver, SplitScheme, SplitSchemeManager,
    SplitSchemeManagerBuilder, TracingObserver,
};
pub use types::{
    ClassId, DatasetName, DomainRole, SampleIndex, SchemeName, SplitName, TransformId,
};
