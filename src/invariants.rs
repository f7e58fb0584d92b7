//! Cross-scheme consistency checks.
//!
//! Each check is a pure function over a scheme collection and the arena that
//! owns its subsets. A check returns `Ok(())` or the first violation it finds.

use std::collections::BTreeSet;

use crate::constants::splits::TEST_SPLIT;
use crate::data::{DatasetArena, DatasetId, Role, SubsetDataset};
use crate::errors::{ConfigError, InvariantViolation, SplitError};
use crate::labels::LabelHierarchy;
use crate::splits::{SchemeMap, SplitScheme};
use crate::types::{ClassId, SampleIndex};

/// Splits of one role group must not share classes at `level`.
pub fn check_class_disjoint(
    schemes: &SchemeMap,
    arena: &DatasetArena,
    hierarchy: &dyn LabelHierarchy,
    level: usize,
) -> Result<(), SplitError> {
    for scheme in schemes.values() {
        for (role, group) in scheme.roles() {
            let mut class_sets: Vec<(&str, BTreeSet<ClassId>)> = Vec::with_capacity(group.len());
            for (split, id) in group {
                let subset = resolve(arena, scheme, *role, split, *id)?;
                class_sets.push((split.as_str(), subset.classes_at(hierarchy, level)?));
            }
            for (pos, (left, left_classes)) in class_sets.iter().enumerate() {
                for (right, right_classes) in &class_sets[pos + 1..] {
                    let shared: Vec<ClassId> =
                        left_classes.intersection(right_classes).copied().collect();
                    if !shared.is_empty() {
                        return Err(InvariantViolation::ClassOverlap {
                            scheme: scheme.name().to_string(),
                            role: *role,
                            left: left.to_string(),
                            right: right.to_string(),
                            classes: shared,
                        }
                        .into());
                    }
                }
            }
        }
    }
    Ok(())
}

/// Every role group of every scheme must hold the same ordered test indices.
pub fn check_same_test_set(schemes: &SchemeMap, arena: &DatasetArena) -> Result<(), SplitError> {
    let mut reference: Option<(&SplitScheme, Role, &[SampleIndex])> = None;
    for scheme in schemes.values() {
        for (role, group) in scheme.roles() {
            let id = group
                .get(TEST_SPLIT)
                .copied()
                .ok_or_else(|| InvariantViolation::MissingSplit {
                    scheme: scheme.name().to_string(),
                    role: *role,
                    split: TEST_SPLIT.to_string(),
                })?;
            let indices = resolve(arena, scheme, *role, TEST_SPLIT, id)?.indices();
            match reference {
                None => reference = Some((scheme, *role, indices)),
                Some((reference_scheme, reference_role, expected)) => {
                    if let Some((position, expected, found)) = first_mismatch(expected, indices) {
                        return Err(InvariantViolation::TestSetMismatch {
                            reference_scheme: reference_scheme.name().to_string(),
                            reference_role,
                            scheme: scheme.name().to_string(),
                            role: *role,
                            position,
                            expected,
                            found,
                        }
                        .into());
                    }
                }
            }
        }
    }
    Ok(())
}

/// A split present under several roles of a scheme must cover the same
/// ordered indices under each of them.
pub fn check_roles_consistent(
    schemes: &SchemeMap,
    arena: &DatasetArena,
) -> Result<(), SplitError> {
    for scheme in schemes.values() {
        for split in scheme.all_split_names() {
            let mut first: Option<(Role, &[SampleIndex])> = None;
            for (role, group) in scheme.roles() {
                let Some(id) = group.get(split).copied() else {
                    continue;
                };
                let indices = resolve(arena, scheme, *role, split, id)?.indices();
                match first {
                    None => first = Some((*role, indices)),
                    Some((left_role, expected)) => {
                        if let Some((position, expected, found)) = first_mismatch(expected, indices)
                        {
                            return Err(InvariantViolation::RoleIndexMismatch {
                                scheme: scheme.name().to_string(),
                                split: split.to_string(),
                                left_role,
                                right_role: *role,
                                position,
                                expected,
                                found,
                            }
                            .into());
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Run all checks in construction order.
pub fn check_all(
    schemes: &SchemeMap,
    arena: &DatasetArena,
    hierarchy: &dyn LabelHierarchy,
    level: usize,
) -> Result<(), SplitError> {
    check_class_disjoint(schemes, arena, hierarchy, level)?;
    check_same_test_set(schemes, arena)?;
    check_roles_consistent(schemes, arena)
}

fn resolve<'a>(
    arena: &'a DatasetArena,
    scheme: &SplitScheme,
    role: Role,
    split: &str,
    id: DatasetId,
) -> Result<&'a SubsetDataset, ConfigError> {
    arena.get(id).ok_or_else(|| ConfigError::DanglingDataset {
        scheme: scheme.name().to_string(),
        role,
        split: split.to_string(),
    })
}

/// First position where `expected` and `found` differ, with the values on each side.
fn first_mismatch(
    expected: &[SampleIndex],
    found: &[SampleIndex],
) -> Option<(usize, Option<SampleIndex>, Option<SampleIndex>)> {
    let len = expected.len().max(found.len());
    (0..len)
        .map(|pos| (pos, expected.get(pos).copied(), found.get(pos).copied()))
        .find(|(_, left, right)| left != right)
}
