//! Base types for the structure of an M3 container.

use binrw::{BinRead, BinWrite};
use std::fmt;

/// Every section starts on a multiple of this many bytes
pub const SECTION_ALIGNMENT: usize = 16;

/// Filler written between the end of a section and the next alignment boundary
pub const PADDING_BYTE: u8 = 0xAA;

/// Size of [`Header`] on disk
pub const HEADER_SIZE: usize = 24;

/// Size of [`IndexEntry`] on disk
pub const INDEX_ENTRY_SIZE: usize = 16;

/// Size of [`RawReference`] on disk
pub const REFERENCE_SIZE: usize = 12;

/// Version of the `MD34` header section
pub const HEADER_VERSION: u32 = 11;

/// Four character section identifier
///
/// Held in reading order (`MODL`). The container stores every tag byte-reversed (`LDOM`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

impl Tag {
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Tag(*bytes)
    }

    /// Builds a tag from its on-disk byte order
    pub const fn from_wire(bytes: [u8; 4]) -> Self {
        Tag([bytes[3], bytes[2], bytes[1], bytes[0]])
    }

    /// Returns the on-disk byte order of the tag
    pub const fn to_wire(self) -> [u8; 4] {
        let [a, b, c, d] = self.0;
        [d, c, b, a]
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Parses a tag from its four character text form
    pub fn parse(text: &str) -> Option<Self> {
        let bytes: [u8; 4] = text.as_bytes().try_into().ok()?;
        Some(Tag(bytes))
    }

    /// Maps alternate spellings onto the tag the registry knows them by
    pub fn canonical(self) -> Self {
        if self == tags::PAR3 {
            tags::PAR
        } else {
            self
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02X}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Tags of every section kind the builtin registry knows about
pub mod tags {
    use super::Tag;

    pub const MD34: Tag = Tag::new(b"MD34");
    pub const MODL: Tag = Tag::new(b"MODL");
    pub const ANIM: Tag = Tag::new(b"ANIM");

    pub const CHAR: Tag = Tag::new(b"CHAR");
    pub const U8: Tag = Tag::new(b"U8__");
    pub const U16: Tag = Tag::new(b"U16_");
    pub const U32: Tag = Tag::new(b"U32_");
    pub const I32: Tag = Tag::new(b"I32_");
    pub const REAL: Tag = Tag::new(b"REAL");
    pub const VEC2: Tag = Tag::new(b"VEC2");
    pub const VEC3: Tag = Tag::new(b"VEC3");
    pub const VEC4: Tag = Tag::new(b"VEC4");
    pub const QUAT: Tag = Tag::new(b"QUAT");

    pub const SDR3: Tag = Tag::new(b"SDR3");
    pub const SD2V: Tag = Tag::new(b"SD2V");
    pub const SD3V: Tag = Tag::new(b"SD3V");
    pub const SD4Q: Tag = Tag::new(b"SD4Q");
    pub const SDCC: Tag = Tag::new(b"SDCC");
    pub const SDS6: Tag = Tag::new(b"SDS6");
    pub const SDU3: Tag = Tag::new(b"SDU3");
    pub const SDFG: Tag = Tag::new(b"SDFG");
    pub const SDMB: Tag = Tag::new(b"SDMB");

    pub const SEQS: Tag = Tag::new(b"SEQS");
    pub const BONE: Tag = Tag::new(b"BONE");
    pub const IREF: Tag = Tag::new(b"IREF");
    pub const REGN: Tag = Tag::new(b"REGN");
    pub const BAT: Tag = Tag::new(b"BAT_");
    pub const MATM: Tag = Tag::new(b"MATM");
    pub const MAT: Tag = Tag::new(b"MAT_");
    pub const LAYR: Tag = Tag::new(b"LAYR");
    pub const DIS: Tag = Tag::new(b"DIS_");
    pub const CMP: Tag = Tag::new(b"CMP_");
    pub const CMS: Tag = Tag::new(b"CMS_");
    pub const TER: Tag = Tag::new(b"TER_");
    pub const PAR: Tag = Tag::new(b"PAR_");
    pub const PAR3: Tag = Tag::new(b"PAR3");
    pub const PARC: Tag = Tag::new(b"PARC");
    pub const RIB: Tag = Tag::new(b"RIB_");
    pub const PROJ: Tag = Tag::new(b"PROJ");
    pub const FOR: Tag = Tag::new(b"FOR_");
    pub const LITE: Tag = Tag::new(b"LITE");
    pub const WRP: Tag = Tag::new(b"WRP_");
    pub const ATT: Tag = Tag::new(b"ATT_");
    pub const SSGS: Tag = Tag::new(b"SSGS");
    pub const PHRB: Tag = Tag::new(b"PHRB");
    pub const PHSH: Tag = Tag::new(b"PHSH");
    pub const IKJT: Tag = Tag::new(b"IKJT");
    pub const CAM: Tag = Tag::new(b"CAM_");
    pub const SHBX: Tag = Tag::new(b"SHBX");
}

/// M3 container header
///
/// Always the first section of the file and always index entry 0.
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little, magic = b"43DM")]
pub struct Header {
    /// The offset from the beginning of the file where the index table starts
    pub index_offset: u32,

    /// The number of entries in the index table
    pub index_count: u32,

    /// The root record of the container
    pub root: RawReference,
}

/// A row of the index table describing one section
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct IndexEntry {
    /// The kind of records stored in the section
    #[br(map = |bytes: [u8; 4]| Tag::from_wire(bytes))]
    #[bw(map = |tag: &Tag| tag.to_wire())]
    pub tag: Tag,

    /// The offset from the start of the file where the section starts
    pub offset: u32,

    /// The number of records in the section
    pub count: u32,

    /// The layout version of the records in the section
    pub version: u32,
}

/// A reference as it is stored inside a record
///
/// The referenced tag is implied by the declaring field.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawReference {
    /// Slot in the index table
    pub index: u32,

    /// Number of records referenced, zero for none
    pub count: u32,

    /// Layout version the referencing side expects
    pub version: u32,
}

impl RawReference {
    pub const NULL: RawReference = RawReference {
        index: 0,
        count: 0,
        version: 0,
    };

    pub const fn is_null(&self) -> bool {
        self.count == 0
    }
}

/// A reference joined with the index entry it points at
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reference {
    pub tag: Tag,
    pub version: u32,
    pub index: u32,
    pub offset: u32,
    pub count: u32,
}
