//! Types for reading M3 containers
//!

use binrw::BinRead;
use std::io::Cursor;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    registry::Registry,
    types::{
        tags, Header, IndexEntry, Reference, HEADER_SIZE, HEADER_VERSION, INDEX_ENTRY_SIZE,
    },
};

/// Which root record a container carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::derive::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ContainerKind {
    /// A full model rooted at `MODL`
    Model,
    /// Sequences and bone tracks only, rooted at `ANIM`
    Animation,
}

/// A validated view over the bytes of a container
///
/// ```no_run
/// fn list_sections(bytes: &[u8]) -> m3_codec::error::Result<()> {
///     let container = m3_codec::Container::read(bytes, m3_codec::Registry::builtin())?;
///
///     for (i, entry) in container.entries().iter().enumerate() {
///         println!("{i}: {} v{} x{}", entry.tag, entry.version, entry.count);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Container<'a> {
    data: &'a [u8],
    header: Header,
    entries: Vec<IndexEntry>,
    /// End of the byte span available to each section
    ends: Vec<usize>,
    kind: ContainerKind,
}

impl<'a> Container<'a> {
    /// Checks the header and index table of `data`
    ///
    /// Sections whose layout the registry knows must fit inside the buffer. Sections of
    /// unknown layouts are only checked once something refers to them.
    #[instrument(skip_all, err, fields(len = data.len()))]
    pub fn read(data: &'a [u8], registry: &Registry) -> Result<Container<'a>> {
        let len = data.len() as u64;
        if data.len() < HEADER_SIZE {
            return Err(Error::TruncatedData {
                what: "header".into(),
                end: HEADER_SIZE as u64,
                len,
            });
        }

        let header = Header::read(&mut Cursor::new(data)).map_err(|err| match err {
            binrw::Error::BadMagic { .. } => Error::CorruptContainer {
                reason: "missing 43DM signature".into(),
            },
            other => Error::from(other),
        })?;

        if header.index_count == 0 {
            return Err(Error::CorruptContainer {
                reason: "empty index table".into(),
            });
        }

        let table_end =
            u64::from(header.index_offset) + u64::from(header.index_count) * INDEX_ENTRY_SIZE as u64;
        if table_end > len {
            return Err(Error::TruncatedData {
                what: "index table".into(),
                end: table_end,
                len,
            });
        }

        let mut cursor = Cursor::new(data);
        cursor.set_position(header.index_offset.into());
        let entries = (0..header.index_count)
            .map(|_| IndexEntry::read(&mut cursor).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;

        let first = entries[0];
        if first.tag != tags::MD34 || first.offset != 0 {
            return Err(Error::CorruptContainer {
                reason: format!("index entry 0 is {} at {:#x}", first.tag, first.offset),
            });
        }
        if first.version != HEADER_VERSION {
            debug!(version = first.version, "unexpected header version");
        }

        let root = entries
            .get(header.root.index as usize)
            .filter(|_| !header.root.is_null())
            .ok_or_else(|| Error::CorruptContainer {
                reason: format!("root reference to missing entry {}", header.root.index),
            })?;
        let kind = match root.tag {
            tags::MODL => ContainerKind::Model,
            tags::ANIM => ContainerKind::Animation,
            other => {
                return Err(Error::CorruptContainer {
                    reason: format!("root section is {other}, not MODL or ANIM"),
                })
            }
        };

        for (i, entry) in entries.iter().enumerate().skip(1) {
            let Ok(schema) = registry.lookup(entry.tag, entry.version) else {
                continue;
            };
            let end = u64::from(entry.offset) + u64::from(entry.count) * schema.record_size as u64;
            if end > len {
                return Err(Error::TruncatedData {
                    what: format!("section {i} ({} v{})", entry.tag, entry.version),
                    end,
                    len,
                });
            }
        }

        let index_offset = header.index_offset as usize;
        let ends = entries
            .iter()
            .map(|entry| {
                let start = entry.offset as usize;
                entries
                    .iter()
                    .map(|other| other.offset as usize)
                    .chain([index_offset, data.len()])
                    .filter(|offset| *offset > start)
                    .min()
                    .unwrap_or(data.len())
            })
            .collect();

        debug!(sections = entries.len(), %kind, "read index table");

        Ok(Container {
            data,
            header,
            entries,
            ends,
            kind,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn entry(&self, index: u32) -> Option<&IndexEntry> {
        self.entries.get(index as usize)
    }

    /// Number of bytes from the start of a section to whatever follows it
    pub fn extent(&self, index: u32) -> Option<usize> {
        let entry = self.entry(index)?;
        let end = self.ends.get(index as usize)?;
        Some(end.saturating_sub(entry.offset as usize))
    }

    /// Bytes from the start of a section up to whatever follows it
    pub fn section_bytes(&self, index: u32) -> Option<&'a [u8]> {
        let entry = self.entry(index)?;
        let start = entry.offset as usize;
        let end = *self.ends.get(index as usize)?;
        self.data.get(start..end)
    }

    /// The root record's section
    pub fn root(&self) -> Reference {
        let raw = self.header.root;
        let entry = self.entries[raw.index as usize];
        Reference {
            tag: entry.tag,
            version: entry.version,
            index: raw.index,
            offset: entry.offset,
            count: raw.count.min(entry.count),
        }
    }
}
