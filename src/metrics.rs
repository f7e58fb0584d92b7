use crate::data::{DatasetArena, Role};
use crate::errors::{ConfigError, SplitError};
use crate::hash::index_fingerprint;
use crate::labels::LabelHierarchy;
use crate::splits::SchemeMap;
use crate::types::{DomainRole, SchemeName, SplitName};

/// Size and class coverage of one split of one scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitSummary {
    /// Scheme the split belongs to.
    pub scheme: SchemeName,
    /// Role group the split belongs to.
    pub role: Role,
    /// Split name.
    pub split: SplitName,
    /// Domain the samples were drawn from.
    pub domain: DomainRole,
    /// Number of samples.
    pub len: usize,
    /// Distinct classes at the configured hierarchy level.
    pub classes: usize,
    /// Order-sensitive fingerprint of the index sequence.
    pub fingerprint: u64,
}

/// Summaries for every split, in scheme, role, then split order.
pub fn summarize(
    schemes: &SchemeMap,
    arena: &DatasetArena,
    hierarchy: &dyn LabelHierarchy,
    level: usize,
) -> Result<Vec<SplitSummary>, SplitError> {
    let mut summaries = Vec::new();
    for scheme in schemes.values() {
        for (role, group) in scheme.roles() {
            for (split, id) in group {
                let subset = arena.get(*id).ok_or_else(|| ConfigError::DanglingDataset {
                    scheme: scheme.name().to_string(),
                    role: *role,
                    split: split.clone(),
                })?;
                summaries.push(SplitSummary {
                    scheme: scheme.name().to_string(),
                    role: *role,
                    split: split.clone(),
                    domain: subset.domain().to_string(),
                    len: subset.len(),
                    classes: subset.classes_at(hierarchy, level)?.len(),
                    fingerprint: index_fingerprint(subset.indices()),
                });
            }
        }
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{InMemoryDataset, LabeledDataset, SubsetDataset};
    use crate::labels::ColumnHierarchy;
    use crate::splits::SplitScheme;
    use std::sync::Arc;

    #[test]
    fn summary_reports_sizes_classes_and_fingerprints() {
        let parent: Arc<dyn LabeledDataset> =
            Arc::new(InMemoryDataset::from_classes("toy", &[0, 0, 1, 2, 2, 2]));
        let mut arena = DatasetArena::new();
        let train = arena.alloc(SubsetDataset::new(parent.clone(), "src", vec![0, 1, 2]).unwrap());
        let test = arena.alloc(SubsetDataset::new(parent, "target", vec![3, 4, 5]).unwrap());
        let mut scheme = SplitScheme::new("s0");
        scheme.insert(Role::Train, "src_train", train);
        scheme.insert(Role::Train, "test", test);
        let mut schemes = SchemeMap::new();
        schemes.insert("s0".to_string(), scheme);

        let summaries = summarize(&schemes, &arena, &ColumnHierarchy, 0).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].split, "src_train");
        assert_eq!(summaries[0].len, 3);
        assert_eq!(summaries[0].classes, 2);
        assert_eq!(summaries[1].domain, "target");
        assert_eq!(summaries[1].classes, 1);
        assert_eq!(summaries[1].fingerprint, index_fingerprint(&[3, 4, 5]));
    }
}
