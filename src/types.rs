/// Name of one constructed split scheme.
/// Example: `test0_10_partitions2_1`
pub type SchemeName = String;
/// Name of a split inside a scheme.
/// Examples: `src_train`, `target_val`, `test`
pub type SplitName = String;
/// Domain role key used in per-role dataset dictionaries.
/// Examples: `src`, `target`
pub type DomainRole = String;
/// Identifier of a base (unsplit) dataset.
/// Examples: `office31_amazon`, `mnist`
pub type DatasetName = String;
/// Opaque transform identifier attached to a role.
/// Examples: `random_resized_crop`, `center_crop`
pub type TransformId = String;
/// Class value at one hierarchy level.
pub type ClassId = u32;
/// Index of a sample inside its parent dataset.
pub type SampleIndex = usize;
