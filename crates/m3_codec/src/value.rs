//! Decoded values and records

use derive_more::derive::{Constructor, Display};
use indexmap::IndexMap;
use std::sync::Arc;

use crate::types::{RawReference, Tag};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Records of one section, shared between every field that references it
///
/// Use [`Arc::make_mut`] to edit a shared section in place.
pub type Section = Arc<Vec<Record>>;

/// Top-level lists of a model that other records point into by position
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Collection {
    Sequences,
    Bones,
    RestMatrices,
    Regions,
    Batches,
    MaterialRefs,
    StandardMaterials,
    DisplacementMaterials,
    CompositeMaterials,
    TerrainMaterials,
    ParticleSystems,
    ParticleCopies,
    Ribbons,
    Projections,
    Forces,
    Lights,
    Warps,
    AttachmentPoints,
    HitTests,
    RigidBodies,
    IkJoints,
    Cameras,
    ShadowBoxes,
}

/// A validated pointer to a record of a [`Collection`]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Constructor)]
#[display("{collection}[{index}]")]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Handle {
    pub collection: Collection,
    pub index: u32,
}

/// An index as read from disk, before it is checked against its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RawIndex {
    /// `None` when a type selector did not name a known collection
    pub target: Option<Collection>,
    /// `None` for the null index
    pub index: Option<u32>,
}

/// A list of indices as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RawIndices {
    pub target: Collection,
    pub indices: Vec<u32>,
}

/// Axis aligned extents plus a bounding sphere radius
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub radius: f32,
}

impl Bounds {
    /// Smallest bounds enclosing both inputs
    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut out = *self;
        for axis in 0..3 {
            out.min[axis] = out.min[axis].min(other.min[axis]);
            out.max[axis] = out.max[axis].max(other.max[axis]);
        }
        out.radius = out.radius.max(other.radius);
        out
    }
}

/// How the engine blends between keyframes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Interpolation {
    Constant,
    #[default]
    Linear,
    Bezier,
    LinearHold,
    BezierHold,
    Other(u16),
}

impl From<u16> for Interpolation {
    fn from(value: u16) -> Self {
        match value {
            0 => Interpolation::Constant,
            1 => Interpolation::Linear,
            2 => Interpolation::Bezier,
            3 => Interpolation::LinearHold,
            4 => Interpolation::BezierHold,
            other => Interpolation::Other(other),
        }
    }
}

impl From<Interpolation> for u16 {
    fn from(value: Interpolation) -> Self {
        match value {
            Interpolation::Constant => 0,
            Interpolation::Linear => 1,
            Interpolation::Bezier => 2,
            Interpolation::LinearHold => 3,
            Interpolation::BezierHold => 4,
            Interpolation::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Keyframe {
    /// Milliseconds from the start of the animation
    pub time: i32,
    pub value: Value,
}

/// An animatable property
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AnimTrack {
    pub interpolation: Interpolation,
    pub flags: u16,
    /// Value used when no keyframe applies
    pub value: Value,
    /// Ordered by strictly ascending time
    pub keys: Vec<Keyframe>,
    /// Only stored by record versions that declare a hold time
    pub hold: Option<f32>,
}

impl AnimTrack {
    pub fn constant(value: Value) -> Self {
        AnimTrack {
            interpolation: Interpolation::Linear,
            flags: 0,
            value,
            keys: Vec::new(),
            hold: None,
        }
    }

    pub fn is_animated(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// A single decoded field
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    I16(i16),
    I32(i32),
    F32(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Quat([f32; 4]),
    /// Blue, green, red, alpha
    Color([u8; 4]),
    Matrix([f32; 16]),
    Bounds(Bounds),
    Reserved(Vec<u8>),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Records(Section),
    Index(RawIndex),
    Handle(Option<Handle>),
    Indices(RawIndices),
    Handles(Vec<Handle>),
    Anim(Box<AnimTrack>),
    /// A reference left undecoded because its category was not imported
    Unresolved(RawReference),
}

impl Value {
    /// Short name of the variant for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::F32(_) => "f32",
            Value::Vec2(_) => "vec2",
            Value::Vec3(_) => "vec3",
            Value::Vec4(_) => "vec4",
            Value::Quat(_) => "quaternion",
            Value::Color(_) => "color",
            Value::Matrix(_) => "matrix",
            Value::Bounds(_) => "bounds",
            Value::Reserved(_) => "reserved bytes",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Records(_) => "records",
            Value::Index(_) => "raw index",
            Value::Handle(_) => "handle",
            Value::Indices(_) => "raw indices",
            Value::Handles(_) => "handles",
            Value::Anim(_) => "animation track",
            Value::Unresolved(_) => "unresolved reference",
        }
    }

    /// Reads any unsigned or non-negative integer variant
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v),
            Value::I16(v) => u32::try_from(v).ok(),
            Value::I32(v) => u32::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            Value::Records(section) => Some(section.as_slice()),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            Value::Handle(handle) => *handle,
            _ => None,
        }
    }

    pub fn as_anim(&self) -> Option<&AnimTrack> {
        match self {
            Value::Anim(track) => Some(track.as_ref()),
            _ => None,
        }
    }

    pub fn as_anim_mut(&mut self) -> Option<&mut AnimTrack> {
        match self {
            Value::Anim(track) => Some(track.as_mut()),
            _ => None,
        }
    }
}

/// Trailing bytes of a record written by a newer version than the registry documents
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque {
    /// The documented layout the known prefix was decoded with
    pub layout_version: u32,
    pub trailing: Vec<u8>,
    /// Fields as they were after assembly, used to tell whether the host edited the record
    pub pristine: Option<IndexMap<&'static str, Value>>,
}

/// A decoded record
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Record {
    pub tag: Tag,
    pub version: u32,
    pub fields: IndexMap<&'static str, Value>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub opaque: Option<Opaque>,
}

impl Record {
    pub fn new(tag: Tag, version: u32) -> Self {
        Record {
            tag,
            version,
            fields: IndexMap::new(),
            opaque: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Sets a field, returning the value it replaced
    pub fn set(&mut self, name: &'static str, value: Value) -> Option<Value> {
        self.fields.insert(name, value)
    }

    pub fn with(mut self, name: &'static str, value: Value) -> Self {
        self.fields.insert(name, value);
        self
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn records(&self, name: &str) -> Option<&[Record]> {
        self.get(name).and_then(Value::as_records)
    }

    pub fn handle(&self, name: &str) -> Option<Handle> {
        self.get(name).and_then(Value::as_handle)
    }

    pub fn anim(&self, name: &str) -> Option<&AnimTrack> {
        self.get(name).and_then(Value::as_anim)
    }

    /// True when any track of this record carries keyframes
    pub fn is_animated(&self) -> bool {
        self.fields
            .values()
            .any(|value| value.as_anim().is_some_and(AnimTrack::is_animated))
    }

    /// True when the record still matches what was decoded and may keep its trailing bytes
    pub fn is_pristine(&self) -> bool {
        self.opaque
            .as_ref()
            .and_then(|opaque| opaque.pristine.as_ref())
            .is_some_and(|pristine| *pristine == self.fields)
    }

    /// Visits this record and every record nested below it
    pub fn walk(&self, f: &mut dyn FnMut(&Record)) {
        f(self);
        for value in self.fields.values() {
            if let Value::Records(section) = value {
                for record in section.iter() {
                    record.walk(f);
                }
            }
        }
    }

    /// Visits this record and every record nested below it, unsharing sections as needed
    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Record)) {
        f(self);
        for value in self.fields.values_mut() {
            if let Value::Records(section) = value {
                for record in Arc::make_mut(section).iter_mut() {
                    record.walk_mut(f);
                }
            }
        }
    }
}
