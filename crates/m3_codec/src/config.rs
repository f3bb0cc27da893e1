//! Options controlling what is decoded and how the graph is written back

use bon::Builder;
use std::collections::BTreeMap;

use crate::types::Tag;

/// Groups of model data that can be imported independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::derive::Display)]
pub enum Category {
    Mesh,
    Effects,
    /// Shared by meshes and effects
    Materials,
    Rig,
    Animations,
}

/// Selects which categories of a model container are decoded
///
/// Animation-only containers ignore these options and are always decoded whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct ImportOptions {
    /// Vertices, faces, regions and batches
    #[builder(default = true)]
    pub include_mesh: bool,

    /// Particle systems, ribbons, projections, forces, lights and warps
    #[builder(default = true)]
    pub include_effects: bool,

    /// Bones and everything attached to them
    #[builder(default = true)]
    pub include_rig: bool,

    /// Sequences and keyframes, only decoded together with the rig
    #[builder(default = true)]
    pub include_animations: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ImportOptions {
    pub fn includes(&self, category: Category) -> bool {
        match category {
            Category::Mesh => self.include_mesh,
            Category::Effects => self.include_effects,
            Category::Materials => self.include_mesh || self.include_effects,
            Category::Rig => self.include_rig,
            Category::Animations => self.include_rig && self.include_animations,
        }
    }
}

/// How many physical sections logically identical data may occupy
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::derive::Display)]
pub enum SectionReuse {
    /// Every reference gets its own section
    #[default]
    Explicit,
    /// Sections with equal content are written once and shared
    Automatic,
}

/// What two sections must share to be merged under [`SectionReuse::Automatic`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::derive::Display)]
pub enum DedupPolicy {
    /// Every encoded byte
    #[default]
    EncodedBytes,
    /// Every encoded byte outside reserved fields
    IgnoreReserved,
}

/// Options for how the container should be written
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ExportOptions {
    /// Keep sequences and keyframes. Ignored for animation-only containers
    #[builder(default = true)]
    pub output_anims: bool,

    #[builder(default)]
    pub section_reuse: SectionReuse,

    /// Remove bones nothing refers to
    #[builder(default = true)]
    pub cull_unused_bones: bool,

    /// Point every blank material layer slot at one shared section
    #[builder(default = true)]
    pub cull_material_layers: bool,

    /// Collapse animated bounds to a single key spanning all of them
    #[builder(default)]
    pub use_only_max_bounds: bool,

    /// Layout version to write per tag, overriding the version records carry
    #[builder(default)]
    pub target_versions: BTreeMap<Tag, u32>,

    #[builder(default)]
    pub dedup_policy: DedupPolicy,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ExportOptions {
    pub fn target_version(&self, tag: Tag) -> Option<u32> {
        self.target_versions.get(&tag).copied()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    use super::{Category, DedupPolicy, ExportOptions, ImportOptions, SectionReuse};
    use crate::types::tags;

    #[test]
    fn export_defaults_match_documented_values() {
        let options = ExportOptions::default();
        assert!(options.output_anims);
        assert!(options.cull_unused_bones);
        assert!(options.cull_material_layers);
        assert!(!options.use_only_max_bounds);
        assert_eq!(options.section_reuse, SectionReuse::Explicit);
        assert_eq!(options.dedup_policy, DedupPolicy::EncodedBytes);
        assert_eq!(options.target_version(tags::PAR), None);
    }

    #[test]
    fn export_builder_overrides() {
        let options = ExportOptions::builder()
            .section_reuse(SectionReuse::Automatic)
            .target_versions(BTreeMap::from([(tags::PAR, 14)]))
            .build();
        assert_eq!(options.target_version(tags::PAR), Some(14));
        assert_eq!(options.section_reuse, SectionReuse::Automatic);
    }

    #[test]
    fn materials_follow_mesh_or_effects() {
        let mesh_only = ImportOptions::builder()
            .include_effects(false)
            .include_rig(false)
            .include_animations(false)
            .build();
        assert!(mesh_only.includes(Category::Materials));
        assert!(!mesh_only.includes(Category::Rig));

        let nothing = ImportOptions::builder()
            .include_mesh(false)
            .include_effects(false)
            .build();
        assert!(!nothing.includes(Category::Materials));
        assert!(nothing.includes(Category::Animations));
    }

    #[test]
    fn animations_need_the_rig() {
        let rigless = ImportOptions::builder().include_rig(false).build();
        assert!(rigless.include_animations);
        assert!(!rigless.includes(Category::Animations));
        assert!(ImportOptions::default().includes(Category::Animations));
    }
}
