//! Declarative layouts for every known `(tag, version)` pair
//!
//! Each [`TagDef`] lists the fields of a record kind once, annotated with the version that
//! introduced them (and, rarely, the version that removed them). A [`Schema`] is the slice
//! of that list active at one version, which is what the reader and writer walk.

mod tables;

use indexmap::IndexMap;
use std::sync::{Arc, OnceLock};

use crate::config::Category;
use crate::error::{Error, Result};
use crate::types::{tags, Tag, REFERENCE_SIZE};
use crate::value::{AnimTrack, Bounds, Collection, Record, Value};

/// Storage width of an index field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U8,
    U16,
    U32,
    I16,
    I32,
}

impl IndexWidth {
    pub const fn size(self) -> usize {
        match self {
            IndexWidth::U8 => 1,
            IndexWidth::U16 | IndexWidth::I16 => 2,
            IndexWidth::U32 | IndexWidth::I32 => 4,
        }
    }

    /// Largest index representable without colliding with the null marker
    pub const fn max_index(self) -> u32 {
        match self {
            IndexWidth::U8 => u8::MAX as u32 - 1,
            IndexWidth::U16 => u16::MAX as u32 - 1,
            IndexWidth::U32 => u32::MAX - 1,
            IndexWidth::I16 => i16::MAX as u32,
            IndexWidth::I32 => i32::MAX as u32,
        }
    }
}

/// Value type of an animation track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimKind {
    Real,
    Vec2,
    Vec3,
    Quat,
    Color,
    I16,
    U32,
    Flag,
    Bounds,
}

impl AnimKind {
    /// Tag of the keyframe sections holding this kind
    pub const fn keys_tag(self) -> Tag {
        match self {
            AnimKind::Real => tags::SDR3,
            AnimKind::Vec2 => tags::SD2V,
            AnimKind::Vec3 => tags::SD3V,
            AnimKind::Quat => tags::SD4Q,
            AnimKind::Color => tags::SDCC,
            AnimKind::I16 => tags::SDS6,
            AnimKind::U32 => tags::SDU3,
            AnimKind::Flag => tags::SDFG,
            AnimKind::Bounds => tags::SDMB,
        }
    }

    /// Field kind of a single value of this track
    pub const fn value_kind(self) -> FieldKind {
        match self {
            AnimKind::Real => FieldKind::F32,
            AnimKind::Vec2 => FieldKind::Vec2,
            AnimKind::Vec3 => FieldKind::Vec3,
            AnimKind::Quat => FieldKind::Quat,
            AnimKind::Color => FieldKind::Color,
            AnimKind::I16 => FieldKind::I16,
            AnimKind::U32 | AnimKind::Flag => FieldKind::U32,
            AnimKind::Bounds => FieldKind::Bounds,
        }
    }
}

/// Wire representation of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    I16,
    I32,
    F32,
    /// `u8` scaled to `0.0..=1.0`
    Fixed8,
    /// `i16` in 1/2048 steps
    Fixed16,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    Color,
    Matrix,
    Bounds,
    Reserved(usize),
    /// Reference to a nested section
    Ref(Tag),
    /// Reference to a top-level collection of the root record
    Collection(Tag, Collection),
    /// Reference to at most one material layer
    Layer,
    /// Reference to a primitive section of indices into a collection
    IndexList(Tag, Collection),
    /// Position of a record inside a collection
    Index(Collection, IndexWidth),
    /// Position inside the collection chosen by another field of the same record
    TypedIndex {
        selector: &'static str,
        targets: &'static [(u32, Collection)],
        width: IndexWidth,
    },
    /// Animation header, optionally followed by a hold time from the given version on
    Anim(AnimKind, Option<u32>),
}

impl FieldKind {
    /// Bytes the field occupies inside a record of the given version
    pub const fn size(&self, version: u32) -> usize {
        match *self {
            FieldKind::U8 | FieldKind::Fixed8 => 1,
            FieldKind::U16 | FieldKind::I16 | FieldKind::Fixed16 => 2,
            FieldKind::U32 | FieldKind::I32 | FieldKind::F32 | FieldKind::Color => 4,
            FieldKind::Vec2 => 8,
            FieldKind::Vec3 => 12,
            FieldKind::Vec4 | FieldKind::Quat => 16,
            FieldKind::Matrix => 64,
            FieldKind::Bounds => 28,
            FieldKind::Reserved(size) => size,
            FieldKind::Ref(_)
            | FieldKind::Collection(..)
            | FieldKind::Layer
            | FieldKind::IndexList(..) => REFERENCE_SIZE,
            FieldKind::Index(_, width) | FieldKind::TypedIndex { width, .. } => width.size(),
            FieldKind::Anim(kind, hold_since) => {
                let hold = match hold_since {
                    Some(since) if version >= since => 4,
                    _ => 0,
                };
                4 + REFERENCE_SIZE + kind.value_kind().size(version) + hold
            }
        }
    }
}

/// Documented default of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Zero,
    Int(i64),
    Float(f32),
    Vec3([f32; 3]),
    Color([u8; 4]),
}

/// One field of a record kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    /// First version the field is present in
    pub since: u32,
    /// First version the field is no longer present in
    pub until: Option<u32>,
    pub default: Literal,
    /// Import category gating the referenced data
    pub category: Option<Category>,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDef {
            name,
            kind,
            since: 0,
            until: None,
            default: Literal::Zero,
            category: None,
        }
    }

    pub const fn since(mut self, version: u32) -> Self {
        self.since = version;
        self
    }

    pub const fn until(mut self, version: u32) -> Self {
        self.until = Some(version);
        self
    }

    pub const fn default(mut self, literal: Literal) -> Self {
        self.default = literal;
        self
    }

    pub const fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn active_at(&self, version: u32) -> bool {
        self.since <= version && self.until.map_or(true, |until| version < until)
    }

    /// The value a record of `version` gets when this field is absent
    pub fn default_value(&self, version: u32) -> Value {
        default_for(self.kind, self.default, version)
    }
}

fn default_for(kind: FieldKind, literal: Literal, version: u32) -> Value {
    let int = match literal {
        Literal::Int(value) => value,
        _ => 0,
    };
    let float = match literal {
        Literal::Float(value) => value,
        Literal::Int(value) => value as f32,
        _ => 0.0,
    };
    let vec3 = match literal {
        Literal::Vec3(value) => value,
        Literal::Float(value) => [value; 3],
        _ => [0.0; 3],
    };
    match kind {
        FieldKind::U8 => Value::U8(int as u8),
        FieldKind::U16 => Value::U16(int as u16),
        FieldKind::U32 => Value::U32(int as u32),
        FieldKind::I16 => Value::I16(int as i16),
        FieldKind::I32 => Value::I32(int as i32),
        FieldKind::F32 | FieldKind::Fixed8 | FieldKind::Fixed16 => Value::F32(float),
        FieldKind::Vec2 => Value::Vec2([vec3[0], vec3[1]]),
        FieldKind::Vec3 => Value::Vec3(vec3),
        FieldKind::Vec4 => Value::Vec4([vec3[0], vec3[1], vec3[2], float]),
        FieldKind::Quat => Value::Quat([0.0, 0.0, 0.0, 1.0]),
        FieldKind::Color => Value::Color(match literal {
            Literal::Color(color) => color,
            _ => [0; 4],
        }),
        FieldKind::Matrix => {
            let mut identity = [0.0; 16];
            for diagonal in [0, 5, 10, 15] {
                identity[diagonal] = 1.0;
            }
            Value::Matrix(identity)
        }
        FieldKind::Bounds => Value::Bounds(Bounds::default()),
        FieldKind::Reserved(size) => Value::Reserved(vec![0; size]),
        FieldKind::Ref(tag) => empty_reference(tag),
        FieldKind::Collection(..) | FieldKind::Layer => Value::Records(Arc::new(Vec::new())),
        FieldKind::IndexList(..) => Value::Handles(Vec::new()),
        FieldKind::Index(..) | FieldKind::TypedIndex { .. } => Value::Handle(None),
        FieldKind::Anim(kind, hold_since) => {
            let mut track = AnimTrack::constant(default_for(kind.value_kind(), literal, version));
            if hold_since.is_some_and(|since| version >= since) {
                track.hold = Some(0.0);
            }
            Value::Anim(Box::new(track))
        }
    }
}

/// Value of a reference field that points at nothing
pub fn empty_reference(tag: Tag) -> Value {
    match tag {
        tags::CHAR => Value::Text(String::new()),
        tags::U8 => Value::Bytes(Vec::new()),
        t if is_primitive(t) => Value::List(Vec::new()),
        _ => Value::Records(Arc::new(Vec::new())),
    }
}

/// True for sections holding plain values rather than records
pub fn is_primitive(tag: Tag) -> bool {
    matches!(
        tag,
        tags::CHAR
            | tags::U8
            | tags::U16
            | tags::U32
            | tags::I32
            | tags::REAL
            | tags::VEC2
            | tags::VEC3
            | tags::VEC4
            | tags::QUAT
    )
}

/// All documented layouts of one record kind
#[derive(Debug, Clone, Copy)]
pub struct TagDef {
    pub tag: Tag,
    /// Documented versions in ascending order
    pub versions: &'static [u32],
    /// Oldest undocumented version that still decodes with the fields active at it
    pub legacy_floor: Option<u32>,
    pub fields: &'static [FieldDef],
}

impl TagDef {
    pub const fn new(tag: Tag, versions: &'static [u32], fields: &'static [FieldDef]) -> Self {
        TagDef {
            tag,
            versions,
            legacy_floor: None,
            fields,
        }
    }

    pub const fn legacy_floor(mut self, version: u32) -> Self {
        self.legacy_floor = Some(version);
        self
    }

    pub fn latest(&self) -> Option<u32> {
        self.versions.iter().copied().max()
    }

    pub fn oldest(&self) -> Option<u32> {
        self.versions.iter().copied().min()
    }
}

/// Active layout of one `(tag, version)` pair
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub tag: Tag,
    /// The version that was asked for
    pub version: u32,
    /// The version whose field list is used
    pub layout_version: u32,
    /// True when `version` is one of the documented versions
    pub documented: bool,
    pub fields: Vec<&'static FieldDef>,
    /// Fields absent from the layout that are filled with defaults on decode
    pub defaulted: Vec<&'static FieldDef>,
    pub record_size: usize,
}

impl Schema {
    /// True when records carry data past the documented layout
    pub fn is_newer(&self) -> bool {
        self.version > self.layout_version
    }
}

/// Lookup table from tag to its layouts
#[derive(Debug, Clone)]
pub struct Registry {
    defs: IndexMap<Tag, TagDef>,
}

impl Registry {
    pub fn new(defs: impl IntoIterator<Item = TagDef>) -> Self {
        Registry {
            defs: defs.into_iter().map(|def| (def.tag, def)).collect(),
        }
    }

    /// The registry covering every record kind of the format
    pub fn builtin() -> &'static Registry {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(|| Registry::new(tables::BUILTIN.iter().copied()))
    }

    pub fn tag_def(&self, tag: Tag) -> Option<&TagDef> {
        self.defs.get(&tag.canonical())
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.defs.keys().copied()
    }

    pub fn latest_version(&self, tag: Tag) -> Option<u32> {
        self.tag_def(tag).and_then(TagDef::latest)
    }

    /// Resolves the layout to use for `version` of `tag`
    ///
    /// Undocumented versions newer than the oldest documented one use the nearest lower
    /// documented layout. Older versions only decode when the tag declares a legacy floor
    /// at or below them.
    pub fn lookup(&self, tag: Tag, version: u32) -> Result<Schema> {
        let tag = tag.canonical();
        let def = self
            .tag_def(tag)
            .ok_or_else(|| Error::UnsupportedVersion {
                tag,
                version,
                documented: "none".into(),
            })?;

        let documented = def.versions.contains(&version);
        let nearest_lower = def.versions.iter().copied().filter(|v| *v < version).max();
        let layout_version = if documented {
            version
        } else if let Some(lower) = nearest_lower {
            lower
        } else if def.legacy_floor.is_some_and(|floor| version >= floor) {
            version
        } else {
            return Err(Error::UnsupportedVersion {
                tag,
                version,
                documented: join_versions(def.versions),
            });
        };

        let fields: Vec<&'static FieldDef> = def
            .fields
            .iter()
            .filter(|field| field.active_at(layout_version))
            .collect();

        let fill_at = def.oldest().map_or(version, |oldest| oldest.max(version));
        let defaulted = def
            .fields
            .iter()
            .filter(|field| field.active_at(fill_at) && !field.active_at(layout_version))
            .collect();

        let record_size = fields
            .iter()
            .map(|field| field.kind.size(layout_version))
            .sum();

        Ok(Schema {
            tag,
            version,
            layout_version,
            documented,
            fields,
            defaulted,
            record_size,
        })
    }

    /// A record of `tag` holding every documented default at `version`
    pub fn default_record(&self, tag: Tag, version: u32) -> Result<Record> {
        let schema = self.lookup(tag, version)?;
        let mut record = Record::new(tag, version);
        for field in schema.fields.iter().chain(schema.defaulted.iter()) {
            record.fields.insert(field.name, field.default_value(version));
        }
        Ok(record)
    }
}

fn join_versions(versions: &[u32]) -> String {
    versions
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{FieldDef, FieldKind, IndexWidth, Literal, Registry, TagDef};
    use crate::error::{ErrorKind, Result};
    use crate::types::{tags, Tag};
    use crate::value::{Collection, Value};

    const THING: Tag = Tag::new(b"THNG");

    static THING_FIELDS: &[FieldDef] = &[
        FieldDef::new("flags", FieldKind::U32),
        FieldDef::new("parent", FieldKind::Index(Collection::Bones, IndexWidth::I16)),
        FieldDef::new("scale", FieldKind::F32).since(12).default(Literal::Float(1.0)),
        FieldDef::new("legacy", FieldKind::U16).until(12),
    ];

    fn registry() -> Registry {
        Registry::new([TagDef::new(THING, &[10, 12], THING_FIELDS)])
    }

    #[test]
    fn exact_version() -> Result<()> {
        let schema = registry().lookup(THING, 12)?;
        assert!(schema.documented);
        assert_eq!(schema.layout_version, 12);
        assert_eq!(
            schema.fields.iter().map(|f| f.name).collect::<Vec<_>>(),
            vec!["flags", "parent", "scale"]
        );
        assert_eq!(schema.record_size, 4 + 2 + 4);
        Ok(())
    }

    #[test]
    fn undocumented_version_uses_nearest_lower_layout() -> Result<()> {
        let schema = registry().lookup(THING, 11)?;
        assert!(!schema.documented);
        assert_eq!(schema.layout_version, 10);
        assert_eq!(schema.record_size, 4 + 2 + 2);
        assert!(schema.is_newer());

        let newer = registry().lookup(THING, 15)?;
        assert!(newer.is_newer());
        assert_eq!(newer.layout_version, 12);
        Ok(())
    }

    #[test]
    fn older_version_without_floor_is_rejected() {
        let err = registry().lookup(THING, 9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
        assert!(err.to_string().contains("THNG version 9"));
    }

    #[test]
    fn older_version_with_floor_fills_defaults() -> Result<()> {
        let schema = Registry::builtin().lookup(tags::PAR, 9)?;
        assert_eq!(schema.layout_version, 9);
        assert!(!schema.documented);
        let defaulted = schema.defaulted.iter().map(|f| f.name).collect::<Vec<_>>();
        assert!(defaulted.contains(&"wind_multiplier"));
        assert!(defaulted.contains(&"noise_edge"));

        let record = Registry::builtin().default_record(tags::PAR, 9)?;
        assert_eq!(record.get("wind_multiplier"), Some(&Value::F32(0.0)));
        assert_eq!(record.get("noise_edge"), Some(&Value::F32(0.1)));
        Ok(())
    }

    #[test]
    fn par3_reads_as_particle_system() -> Result<()> {
        let schema = Registry::builtin().lookup(tags::PAR3, 24)?;
        assert_eq!(schema.tag, tags::PAR);
        assert!(schema.documented);
        assert_eq!(schema.layout_version, 24);
        Ok(())
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = registry().lookup(tags::MODL, 29).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
    }

    #[test]
    fn builtin_covers_every_declared_version() -> Result<()> {
        let registry = Registry::builtin();
        for tag in registry.tags() {
            let def = registry.tag_def(tag).expect("tag listed by the registry");
            for version in def.versions {
                let schema = registry.lookup(tag, *version)?;
                assert!(schema.record_size > 0, "{tag} v{version} has no fields");
            }
        }
        Ok(())
    }

    #[test]
    fn builtin_fields_reference_their_tags() -> Result<()> {
        let schema = Registry::builtin().lookup(tags::MODL, 29)?;
        let kind = |name: &str| schema.fields.iter().find(|f| f.name == name).map(|f| f.kind);
        assert_eq!(
            kind("bones"),
            Some(FieldKind::Collection(tags::BONE, Collection::Bones))
        );
        assert_eq!(
            kind("particle_systems"),
            Some(FieldKind::Collection(tags::PAR, Collection::ParticleSystems))
        );
        assert_eq!(kind("name"), Some(FieldKind::Ref(tags::CHAR)));
        Ok(())
    }

    #[test]
    fn default_tracks_carry_hold_where_stored() -> Result<()> {
        let current = Registry::builtin().default_record(tags::PAR, 24)?;
        assert_eq!(current.anim("color_init").and_then(|t| t.hold), Some(0.0));
        assert_eq!(current.anim("color2_init").and_then(|t| t.hold), None);

        let older = Registry::builtin().default_record(tags::PAR, 14)?;
        assert_eq!(older.anim("color_init").and_then(|t| t.hold), None);
        Ok(())
    }

    #[test]
    fn anim_fields_grow_with_hold_time() {
        let kind = FieldKind::Anim(super::AnimKind::Color, Some(17));
        assert_eq!(kind.size(14), 4 + 12 + 4);
        assert_eq!(kind.size(17), 4 + 12 + 4 + 4);
    }
}
