//! Hierarchical labels and level accessors.
//!
//! A `Label` stores one class value per hierarchy level, in whatever level
//! order the originating dataset uses. Disjointness checks only ever look at
//! the value at the configured level; two samples with distinct fine classes
//! that share a coarse class collide when checked at the coarse level.

use serde::{Deserialize, Serialize};

use crate::types::ClassId;

/// Class values of one sample, one entry per hierarchy level.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    levels: Vec<ClassId>,
}

impl Label {
    /// Single-level label.
    pub fn flat(class: ClassId) -> Self {
        Self {
            levels: vec![class],
        }
    }

    /// Multi-level label; `levels[0]` is hierarchy level 0.
    pub fn hierarchical(levels: Vec<ClassId>) -> Self {
        Self { levels }
    }

    /// Raw class values, level 0 first.
    pub fn levels(&self) -> &[ClassId] {
        &self.levels
    }

    /// Number of hierarchy levels carried by this label.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}

impl From<ClassId> for Label {
    fn from(value: ClassId) -> Self {
        Label::flat(value)
    }
}

/// Resolves a label to its class value at a hierarchy level.
pub trait LabelHierarchy: Send + Sync {
    /// Class value of `label` at `level`, or `None` when the label has no such level.
    fn label_at_level(&self, label: &Label, level: usize) -> Option<ClassId>;
}

/// Column lookup: level `n` is `levels[n]`.
///
/// Single-level labels answer every level with their only value, matching
/// datasets that carry no hierarchy at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColumnHierarchy;

impl LabelHierarchy for ColumnHierarchy {
    fn label_at_level(&self, label: &Label, level: usize) -> Option<ClassId> {
        match label.levels() {
            [only] => Some(*only),
            levels => levels.get(level).copied(),
        }
    }
}
