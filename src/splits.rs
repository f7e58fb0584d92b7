use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SplitConfig;
use crate::data::{DatasetArena, DatasetId, Role, RoleDatasets, SubsetDataset};
use crate::errors::{ConfigError, SplitError};
use crate::invariants;
use crate::labels::{ColumnHierarchy, Label, LabelHierarchy};
use crate::manifest::SchemeManifest;
use crate::metrics::{SplitSummary, summarize};
use crate::partition::{PartitionRequest, SchemePartitioner, scheme_name};
use crate::types::{SchemeName, SplitName};

/// Schemes keyed by name, in construction order.
pub type SchemeMap = IndexMap<SchemeName, SplitScheme>;

/// One complete assignment of splits for a partition index.
///
/// Maps role → split name → arena handle. Both maps keep insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitScheme {
    name: SchemeName,
    roles: IndexMap<Role, IndexMap<SplitName, DatasetId>>,
}

impl SplitScheme {
    /// Empty scheme called `name`.
    pub fn new(name: impl Into<SchemeName>) -> Self {
        Self {
            name: name.into(),
            roles: IndexMap::new(),
        }
    }

    /// Register `id` as `split` under `role`, replacing any previous entry.
    pub fn insert(&mut self, role: Role, split: impl Into<SplitName>, id: DatasetId) {
        self.roles
            .entry(role)
            .or_default()
            .insert(split.into(), id);
    }

    /// Scheme name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role groups in insertion order.
    pub fn roles(&self) -> impl Iterator<Item = (&Role, &IndexMap<SplitName, DatasetId>)> {
        self.roles.iter()
    }

    /// Split group registered under `role`.
    pub fn role(&self, role: Role) -> Option<&IndexMap<SplitName, DatasetId>> {
        self.roles.get(&role)
    }

    /// Arena handle of `split` under `role`.
    pub fn dataset_id(&self, role: Role, split: &str) -> Option<DatasetId> {
        self.roles.get(&role)?.get(split).copied()
    }

    /// Every split name across all roles, deduplicated, in first-seen order.
    pub fn all_split_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for group in self.roles.values() {
            for split in group.keys() {
                if !names.contains(&split.as_str()) {
                    names.push(split);
                }
            }
        }
        names
    }
}

/// Details of one dataset lookup, handed to a `SplitObserver`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatasetAccess<'a> {
    /// Current scheme.
    pub scheme: &'a str,
    /// Requested split.
    pub split: &'a str,
    /// Requested role.
    pub role: Role,
    /// Number of samples in the returned view.
    pub len: usize,
    /// Transform the view is served with.
    pub transform: Option<&'a str>,
}

/// Receives verbose dataset lookups.
pub trait SplitObserver: Send + Sync {
    /// Called once per verbose lookup, after the dataset was resolved.
    fn dataset_accessed(&self, access: &DatasetAccess<'_>);
}

/// Emits each lookup as a `tracing` info event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl SplitObserver for TracingObserver {
    fn dataset_accessed(&self, access: &DatasetAccess<'_>) {
        info!(
            scheme = access.scheme,
            split = access.split,
            len = access.len,
            role = %access.role,
            transform = access.transform.unwrap_or("none"),
            "getting split"
        );
    }
}

/// Discards every lookup.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl SplitObserver for NullObserver {
    fn dataset_accessed(&self, _access: &DatasetAccess<'_>) {}
}

/// Configures and builds a `SplitSchemeManager`.
pub struct SplitSchemeManagerBuilder {
    config: SplitConfig,
    hierarchy: Arc<dyn LabelHierarchy>,
    observer: Arc<dyn SplitObserver>,
}

impl SplitSchemeManagerBuilder {
    /// Builder with `ColumnHierarchy` and `TracingObserver`.
    pub fn new(config: SplitConfig) -> Self {
        Self {
            config,
            hierarchy: Arc::new(ColumnHierarchy),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Label accessor used by disjointness checks and label counts.
    ///
    /// Pair it with the accessor the partitioner allocates classes with
    /// (`ClassDisjointPartitioner::with_hierarchy`). Construction re-checks the
    /// partitioner's output through this accessor only, so a coarser accessor
    /// here surfaces a mismatch as `InvariantViolation::ClassOverlap`.
    pub fn hierarchy(mut self, hierarchy: Arc<dyn LabelHierarchy>) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    /// Hook receiving verbose dataset lookups.
    pub fn observer(mut self, observer: Arc<dyn SplitObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Build `num_training_sets` schemes and verify them.
    ///
    /// Fails without returning a manager if the partitioner fails or any
    /// consistency check finds a violation.
    pub fn build(
        self,
        datasets: &RoleDatasets,
        partitioner: &dyn SchemePartitioner,
    ) -> Result<SplitSchemeManager, SplitError> {
        let config = self.config.validated()?;
        if datasets.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "datasets",
                reason: "at least one role is required".to_string(),
            }
            .into());
        }

        let mut arena = DatasetArena::new();
        let mut schemes = SchemeMap::new();
        for partition_index in 0..config.num_training_sets {
            let name = scheme_name(
                config.test_size,
                config.test_start_idx,
                config.num_training_partitions,
                partition_index,
            );
            let request = PartitionRequest {
                partition_index,
                num_training_partitions: config.num_training_partitions,
                test_size: config.test_size,
                test_start_idx: config.test_start_idx,
                hierarchy_level: config.hierarchy_level,
            };
            let mut scheme = SplitScheme::new(name.clone());
            for (role, domains) in datasets {
                let transform = config.transform_for(*role).cloned();
                for (split, subset) in partitioner.build(domains, &request)? {
                    let id = arena.alloc(subset.with_transform(transform.clone()));
                    scheme.insert(*role, split, id);
                }
            }
            debug!(
                scheme = %name,
                partition_index,
                splits = scheme.all_split_names().len(),
                "built split scheme"
            );
            schemes.insert(name, scheme);
        }

        invariants::check_all(
            &schemes,
            &arena,
            self.hierarchy.as_ref(),
            config.hierarchy_level,
        )?;
        debug!(
            schemes = schemes.len(),
            subsets = arena.len(),
            "split schemes passed consistency checks"
        );

        let scheme_names = schemes.keys().cloned().collect();
        Ok(SplitSchemeManager {
            config,
            schemes,
            arena,
            scheme_names,
            current: None,
            hierarchy: self.hierarchy,
            observer: self.observer,
        })
    }
}

/// Owns every split scheme of an experiment and serves the selected one.
///
/// Schemes are immutable after construction. Only the current-scheme pointer
/// changes, through `select_scheme`.
pub struct SplitSchemeManager {
    config: SplitConfig,
    schemes: SchemeMap,
    arena: DatasetArena,
    scheme_names: Vec<SchemeName>,
    current: Option<SchemeName>,
    hierarchy: Arc<dyn LabelHierarchy>,
    observer: Arc<dyn SplitObserver>,
}

impl fmt::Debug for SplitSchemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitSchemeManager")
            .field("config", &self.config)
            .field("scheme_names", &self.scheme_names)
            .field("current", &self.current)
            .finish()
    }
}

impl SplitSchemeManager {
    /// Build with the default label accessor and a `tracing` observer.
    pub fn new(
        datasets: &RoleDatasets,
        config: SplitConfig,
        partitioner: &dyn SchemePartitioner,
    ) -> Result<Self, SplitError> {
        SplitSchemeManagerBuilder::new(config).build(datasets, partitioner)
    }

    /// Builder for a manager with a custom label accessor or observer.
    pub fn builder(config: SplitConfig) -> SplitSchemeManagerBuilder {
        SplitSchemeManagerBuilder::new(config)
    }

    /// Validated configuration the schemes were built from.
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Scheme names in construction (partition) order.
    pub fn scheme_names(&self) -> &[SchemeName] {
        &self.scheme_names
    }

    /// Scheme called `name`.
    pub fn scheme(&self, name: &str) -> Option<&SplitScheme> {
        self.schemes.get(name)
    }

    /// Schemes in construction order.
    pub fn iter_schemes(&self) -> impl Iterator<Item = &SplitScheme> {
        self.schemes.values()
    }

    /// Arena owning every split view.
    pub fn arena(&self) -> &DatasetArena {
        &self.arena
    }

    /// Point queries at `name`.
    pub fn select_scheme(&mut self, name: &str) -> Result<(), SplitError> {
        if !self.schemes.contains_key(name) {
            return Err(ConfigError::UnknownScheme(name.to_string()).into());
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Name of the selected scheme, if any.
    pub fn current_scheme_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Dataset for `split` under `role` in the current scheme.
    ///
    /// With `verbose`, the lookup is reported to the observer.
    pub fn get_dataset(
        &self,
        role: Role,
        split: &str,
        verbose: bool,
    ) -> Result<&SubsetDataset, SplitError> {
        let scheme = self.current_scheme()?;
        let group = scheme.role(role).ok_or_else(|| ConfigError::UnknownRole {
            scheme: scheme.name().to_string(),
            role,
        })?;
        let id = group
            .get(split)
            .copied()
            .ok_or_else(|| ConfigError::UnknownSplit {
                scheme: scheme.name().to_string(),
                role,
                split: split.to_string(),
            })?;
        let dataset = self
            .arena
            .get(id)
            .ok_or_else(|| ConfigError::DanglingDataset {
                scheme: scheme.name().to_string(),
                role,
                split: split.to_string(),
            })?;
        if verbose {
            self.observer.dataset_accessed(&DatasetAccess {
                scheme: scheme.name(),
                split,
                role,
                len: dataset.len(),
                transform: dataset.transform(),
            });
        }
        Ok(dataset)
    }

    /// Raw labels of `split`, in split order.
    pub fn get_labels(&self, role: Role, split: &str) -> Result<Vec<&Label>, SplitError> {
        Ok(self.get_dataset(role, split, false)?.labels()?)
    }

    /// Number of distinct classes of `split` at the configured hierarchy level.
    pub fn get_label_count(&self, role: Role, split: &str) -> Result<usize, SplitError> {
        let dataset = self.get_dataset(role, split, false)?;
        Ok(dataset
            .classes_at(self.hierarchy.as_ref(), self.config.hierarchy_level)?
            .len())
    }

    /// Splits of `role` in the current scheme, in scheme order.
    ///
    /// Only splits named in `include` (default: all) and absent from `exclude`
    /// are returned. Names in either list that the role group lacks are
    /// ignored, so one list can serve every scheme and role. Each returned
    /// dataset is reported to the observer.
    pub fn get_dataset_group(
        &self,
        role: Role,
        include: Option<&[&str]>,
        exclude: Option<&[&str]>,
    ) -> Result<IndexMap<SplitName, &SubsetDataset>, SplitError> {
        let scheme = self.current_scheme()?;
        let group = scheme.role(role).ok_or_else(|| ConfigError::UnknownRole {
            scheme: scheme.name().to_string(),
            role,
        })?;
        let exclude = exclude.unwrap_or_default();

        let mut selected = IndexMap::new();
        for split in group.keys() {
            let included = include.is_none_or(|names| names.contains(&split.as_str()));
            if !included || exclude.contains(&split.as_str()) {
                continue;
            }
            selected.insert(split.clone(), self.get_dataset(role, split, true)?);
        }
        Ok(selected)
    }

    /// Per-split sizes, class counts, and fingerprints for every scheme.
    pub fn summary(&self) -> Result<Vec<SplitSummary>, SplitError> {
        summarize(
            &self.schemes,
            &self.arena,
            self.hierarchy.as_ref(),
            self.config.hierarchy_level,
        )
    }

    /// Serializable snapshot of the configuration and every split's indices.
    pub fn manifest(&self) -> Result<SchemeManifest, SplitError> {
        SchemeManifest::capture(&self.config, &self.schemes, &self.arena)
    }

    fn current_scheme(&self) -> Result<&SplitScheme, ConfigError> {
        let name = self.current.as_deref().ok_or(ConfigError::NoCurrentScheme)?;
        self.schemes
            .get(name)
            .ok_or_else(|| ConfigError::UnknownScheme(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DomainDatasets, InMemoryDataset, LabeledDataset};
    use crate::partition::ClassDisjointPartitioner;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        seen: Mutex<Vec<(String, String, Role, usize)>>,
    }

    impl SplitObserver for RecordingObserver {
        fn dataset_accessed(&self, access: &DatasetAccess<'_>) {
            self.seen.lock().unwrap().push((
                access.scheme.to_string(),
                access.split.to_string(),
                access.role,
                access.len,
            ));
        }
    }

    fn datasets() -> RoleDatasets {
        let src: Vec<u32> = (0..40).map(|idx| idx / 10).collect();
        let target: Vec<u32> = (0..40).map(|idx| 4 + idx / 10).collect();
        let mut domains = DomainDatasets::new();
        domains.insert(
            "src".to_string(),
            Arc::new(InMemoryDataset::from_classes("A", &src)) as Arc<dyn LabeledDataset>,
        );
        domains.insert(
            "target".to_string(),
            Arc::new(InMemoryDataset::from_classes("B", &target)) as Arc<dyn LabeledDataset>,
        );
        let mut datasets = RoleDatasets::new();
        datasets.insert(Role::Train, domains.clone());
        datasets.insert(Role::Eval, domains);
        datasets
    }

    fn config() -> SplitConfig {
        SplitConfig {
            train_transform: Some("augment".into()),
            eval_transform: Some("center_crop".into()),
            test_size: 10,
            num_training_sets: 2,
            ..SplitConfig::default()
        }
    }

    #[test]
    fn scheme_all_split_names_deduplicates_across_roles() {
        let mut arena = DatasetArena::new();
        let parent: Arc<dyn LabeledDataset> =
            Arc::new(InMemoryDataset::from_classes("toy", &[0, 1]));
        let id = arena.alloc(SubsetDataset::new(parent, "src", vec![0]).unwrap());
        let mut scheme = SplitScheme::new("s");
        scheme.insert(Role::Train, "src_train", id);
        scheme.insert(Role::Eval, "src_train", id);
        scheme.insert(Role::Eval, "test", id);
        assert_eq!(scheme.all_split_names(), vec!["src_train", "test"]);
        assert_eq!(scheme.dataset_id(Role::Eval, "test"), Some(id));
        assert_eq!(scheme.dataset_id(Role::Train, "test"), None);
    }

    #[test]
    fn construction_does_not_select_a_scheme() {
        let manager =
            SplitSchemeManager::new(&datasets(), config(), &ClassDisjointPartitioner::default())
                .unwrap();
        assert_eq!(manager.current_scheme_name(), None);
        let err = manager.get_dataset(Role::Train, "src_train", false).unwrap_err();
        assert!(matches!(
            err,
            SplitError::Configuration(ConfigError::NoCurrentScheme)
        ));
    }

    #[test]
    fn empty_role_dictionary_is_rejected() {
        let err = SplitSchemeManager::new(
            &RoleDatasets::new(),
            config(),
            &ClassDisjointPartitioner::default(),
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn transforms_follow_roles() {
        let mut manager =
            SplitSchemeManager::new(&datasets(), config(), &ClassDisjointPartitioner::default())
                .unwrap();
        let first = manager.scheme_names()[0].clone();
        manager.select_scheme(&first).unwrap();
        let train = manager.get_dataset(Role::Train, "src_train", false).unwrap();
        let eval = manager.get_dataset(Role::Eval, "src_train", false).unwrap();
        assert_eq!(train.transform(), Some("augment"));
        assert_eq!(eval.transform(), Some("center_crop"));
        assert_eq!(train.indices(), eval.indices());
    }

    #[test]
    fn verbose_lookups_reach_the_observer() {
        let observer = Arc::new(RecordingObserver::default());
        let mut manager = SplitSchemeManager::builder(config())
            .observer(observer.clone())
            .build(&datasets(), &ClassDisjointPartitioner::default())
            .unwrap();
        let second = manager.scheme_names()[1].clone();
        manager.select_scheme(&second).unwrap();

        manager.get_dataset(Role::Eval, "test", false).unwrap();
        assert!(observer.seen.lock().unwrap().is_empty());

        manager.get_dataset(Role::Eval, "test", true).unwrap();
        let seen = observer.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(second.clone(), "test".to_string(), Role::Eval, 10)]);
    }

    #[test]
    fn dataset_group_filters_and_reports_each_split() {
        let observer = Arc::new(RecordingObserver::default());
        let mut manager = SplitSchemeManager::builder(config())
            .observer(observer.clone())
            .build(&datasets(), &ClassDisjointPartitioner::default())
            .unwrap();
        let first = manager.scheme_names()[0].clone();
        manager.select_scheme(&first).unwrap();

        let all = manager.get_dataset_group(Role::Train, None, None).unwrap();
        assert_eq!(
            all.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["src_train", "src_val", "target_train", "target_val", "test"]
        );
        assert_eq!(observer.seen.lock().unwrap().len(), 5);

        let subset = manager
            .get_dataset_group(
                Role::Eval,
                Some(&["test", "src_train", "src_val"][..]),
                Some(&["src_val"][..]),
            )
            .unwrap();
        assert_eq!(
            subset.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["src_train", "test"]
        );
    }

    #[test]
    fn dataset_group_ignores_names_the_role_lacks() {
        let mut manager =
            SplitSchemeManager::new(&datasets(), config(), &ClassDisjointPartitioner::default())
                .unwrap();
        let first = manager.scheme_names()[0].clone();
        manager.select_scheme(&first).unwrap();

        let group = manager
            .get_dataset_group(Role::Eval, Some(&["src_train", "target_test"][..]), None)
            .unwrap();
        assert_eq!(group.keys().map(String::as_str).collect::<Vec<_>>(), vec!["src_train"]);

        let group = manager
            .get_dataset_group(Role::Eval, None, Some(&["test", "nope"][..]))
            .unwrap();
        assert_eq!(
            group.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["src_train", "src_val", "target_train", "target_val"]
        );

        let empty = manager
            .get_dataset_group(Role::Train, Some(&["nope"][..]), None)
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        let mut manager =
            SplitSchemeManager::new(&datasets(), config(), &ClassDisjointPartitioner::default())
                .unwrap();
        let first = manager.scheme_names()[0].clone();
        manager.select_scheme(&first).unwrap();

        let group = manager
            .get_dataset_group(
                Role::Train,
                Some(&["test", "target_val"][..]),
                Some(&["target_val"][..]),
            )
            .unwrap();
        assert_eq!(group.keys().map(String::as_str).collect::<Vec<_>>(), vec!["test"]);

        let nothing = manager
            .get_dataset_group(Role::Train, Some(&["test"][..]), Some(&["test"][..]))
            .unwrap();
        assert!(nothing.is_empty());
    }

    #[test]
    fn unknown_role_is_a_configuration_error() {
        let mut only_train = datasets();
        only_train.shift_remove(&Role::Eval);
        let mut manager = SplitSchemeManager::new(
            &only_train,
            config(),
            &ClassDisjointPartitioner::default(),
        )
        .unwrap();
        let first = manager.scheme_names()[0].clone();
        manager.select_scheme(&first).unwrap();
        let err = manager.get_dataset(Role::Eval, "test", false).unwrap_err();
        assert!(matches!(
            err,
            SplitError::Configuration(ConfigError::UnknownRole { role: Role::Eval, .. })
        ));
    }

    #[test]
    fn manager_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SplitSchemeManager>();
    }

    #[test]
    fn debug_output_lists_scheme_names() {
        let manager =
            SplitSchemeManager::new(&datasets(), config(), &ClassDisjointPartitioner::default())
                .unwrap();
        let repr = format!("{manager:?}");
        assert!(repr.contains("SplitSchemeManager"));
        assert!(repr.contains("test0_10_partitions2_1"));
    }
}
