//! Serializable snapshot of a manager's schemes.
//!
//! Two managers built from identical inputs produce equal manifests, which
//! makes the manifest the unit for reproducibility comparisons.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::SplitConfig;
use crate::data::{DatasetArena, Role};
use crate::errors::{ConfigError, SplitError};
use crate::splits::SchemeMap;
use crate::types::{DatasetName, DomainRole, SampleIndex, SchemeName, SplitName, TransformId};

/// One split as recorded in a manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitEntry {
    /// Identifier of the parent dataset.
    pub parent: DatasetName,
    /// Domain the samples were drawn from.
    pub domain: DomainRole,
    /// Transform the split is served with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformId>,
    /// Parent-relative indices, in split order.
    pub indices: Vec<SampleIndex>,
}

/// Configuration plus every scheme's split contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeManifest {
    /// Configuration the schemes were built from.
    pub config: SplitConfig,
    /// Scheme → role → split entries, in construction order.
    pub schemes: IndexMap<SchemeName, IndexMap<Role, IndexMap<SplitName, SplitEntry>>>,
}

impl SchemeManifest {
    /// Record `schemes` as they currently stand in `arena`.
    pub fn capture(
        config: &SplitConfig,
        schemes: &SchemeMap,
        arena: &DatasetArena,
    ) -> Result<Self, SplitError> {
        let mut captured = IndexMap::new();
        for (name, scheme) in schemes {
            let mut roles = IndexMap::new();
            for (role, group) in scheme.roles() {
                let mut splits = IndexMap::new();
                for (split, id) in group {
                    let subset = arena.get(*id).ok_or_else(|| ConfigError::DanglingDataset {
                        scheme: name.clone(),
                        role: *role,
                        split: split.clone(),
                    })?;
                    splits.insert(
                        split.clone(),
                        SplitEntry {
                            parent: subset.parent().id().to_string(),
                            domain: subset.domain().to_string(),
                            transform: subset.transform().map(str::to_string),
                            indices: subset.indices().to_vec(),
                        },
                    );
                }
                roles.insert(*role, splits);
            }
            captured.insert(name.clone(), roles);
        }
        Ok(Self {
            config: config.clone(),
            schemes: captured,
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a manifest written by `to_json`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Recorded scheme names in construction order.
    pub fn scheme_names(&self) -> impl Iterator<Item = &str> {
        self.schemes.keys().map(String::as_str)
    }
}
