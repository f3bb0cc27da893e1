//! Decoding of sections into records, following references between them

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

use crate::{
    anim,
    codec::{read_index, read_plain, read_reference},
    config::ImportOptions,
    error::{Error, Result},
    read::{Container, ContainerKind},
    registry::{FieldDef, FieldKind, Registry, Schema},
    types::{tags, RawReference, Reference, Tag, SECTION_ALIGNMENT, PADDING_BYTE},
    value::{Opaque, RawIndex, RawIndices, Record, Section, Value},
};

/// The root record of a container with every selected reference decoded
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub kind: ContainerKind,
    pub root: Record,
    /// The options the model was decoded with
    pub import: ImportOptions,
}

/// Decodes sections of one container, sharing every section it has already seen
pub struct Resolver<'c, 'a> {
    container: &'c Container<'a>,
    registry: &'c Registry,
    import: ImportOptions,
    memo: HashMap<(Tag, u32), Section>,
    in_progress: HashSet<(Tag, u32)>,
}

impl<'c, 'a> Resolver<'c, 'a> {
    /// Animation-only containers are always decoded whole
    pub fn new(container: &'c Container<'a>, registry: &'c Registry, import: &ImportOptions) -> Self {
        let import = match container.kind() {
            ContainerKind::Model => *import,
            ContainerKind::Animation => ImportOptions::default(),
        };
        Resolver {
            container,
            registry,
            import,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn import(&self) -> &ImportOptions {
        &self.import
    }

    /// Joins a wire reference with the index entry it names
    ///
    /// Returns `None` for the null reference.
    pub fn reference(
        &self,
        owner: Tag,
        field: &str,
        raw: RawReference,
        expected: Tag,
    ) -> Result<Option<Reference>> {
        if raw.is_null() {
            return Ok(None);
        }
        let dangling = || Error::DanglingReference {
            record: owner.to_string(),
            field: field.to_owned(),
            index: raw.index,
            target: format!("index table ({expected})"),
        };

        let entry = self.container.entry(raw.index).ok_or_else(dangling)?;
        if entry.tag.canonical() != expected || raw.index == 0 {
            return Err(dangling());
        }
        if raw.count > entry.count {
            return Err(Error::TruncatedData {
                what: format!("{owner}.{field}"),
                end: raw.count.into(),
                len: entry.count.into(),
            });
        }
        if raw.version != entry.version {
            warn!(
                %owner,
                field,
                reference = raw.version,
                entry = entry.version,
                "reference version disagrees with index entry"
            );
        }

        Ok(Some(Reference {
            tag: entry.tag.canonical(),
            version: entry.version,
            index: raw.index,
            offset: entry.offset,
            count: raw.count,
        }))
    }

    /// Decodes the records a reference points at
    ///
    /// Each `(tag, offset)` is decoded in full once. Later references share the result,
    /// sliced to their own count.
    pub fn resolve(&mut self, reference: &Reference) -> Result<Section> {
        let key = (reference.tag, reference.offset);
        if let Some(section) = self.memo.get(&key) {
            trace!(tag = %reference.tag, offset = reference.offset, "shared section");
            return Ok(slice(section, reference.count));
        }
        if !self.in_progress.insert(key) {
            return Err(Error::CyclicReference {
                tag: reference.tag,
                offset: reference.offset,
            });
        }

        let section = self.decode_section(reference);
        self.in_progress.remove(&key);
        let section = Arc::new(section?);
        self.memo.insert(key, Arc::clone(&section));
        Ok(slice(&section, reference.count))
    }

    /// Decodes the root record and everything the import options select below it
    #[instrument(skip_all, err)]
    pub fn resolve_model(mut self) -> Result<ResolvedModel> {
        let reference = self.container.root();
        let section = self.resolve(&reference)?;
        let root = section.first().cloned().ok_or_else(|| Error::CorruptContainer {
            reason: "root section holds no records".into(),
        })?;
        debug!(tag = %root.tag, version = root.version, sections = self.memo.len(), "resolved model");

        Ok(ResolvedModel {
            kind: self.container.kind(),
            root,
            import: self.import,
        })
    }

    fn decode_section(&mut self, reference: &Reference) -> Result<Vec<Record>> {
        let entry = *self
            .container
            .entry(reference.index)
            .ok_or_else(|| Error::CorruptContainer {
                reason: format!("missing index entry {}", reference.index),
            })?;
        let schema = self.registry.lookup(entry.tag, entry.version)?;
        let bytes = self
            .container
            .section_bytes(reference.index)
            .unwrap_or_default();

        let stride = if schema.is_newer() {
            infer_stride(bytes, entry.count as usize, schema.record_size)
        } else {
            schema.record_size
        };
        let needed = entry.count as usize * stride;
        if needed > bytes.len() {
            return Err(Error::TruncatedData {
                what: format!("section {} ({} v{})", reference.index, entry.tag, entry.version),
                end: (entry.offset as usize + needed) as u64,
                len: self.container.data().len() as u64,
            });
        }

        (0..entry.count as usize)
            .map(|i| {
                let start = i * stride;
                let known = &bytes[start..start + schema.record_size];
                let trailing = &bytes[start + schema.record_size..start + stride];
                self.decode_record(&schema, known, trailing)
            })
            .collect()
    }

    fn decode_record(&mut self, schema: &Schema, bytes: &[u8], trailing: &[u8]) -> Result<Record> {
        let mut record = Record::new(schema.tag, schema.version);
        let mut cursor = Cursor::new(bytes);
        for field in &schema.fields {
            let value = self.decode_field(&record, schema.layout_version, field, &mut cursor)?;
            record.fields.insert(field.name, value);
        }
        for field in &schema.defaulted {
            record.fields.insert(field.name, field.default_value(schema.version));
        }
        if schema.is_newer() {
            record.opaque = Some(Opaque {
                layout_version: schema.layout_version,
                trailing: trailing.to_vec(),
                pristine: None,
            });
        }
        Ok(record)
    }

    fn decode_field(
        &mut self,
        record: &Record,
        version: u32,
        field: &FieldDef,
        cursor: &mut Cursor<&[u8]>,
    ) -> Result<Value> {
        let owner = record.tag;
        let value = match field.kind {
            FieldKind::Ref(tag) | FieldKind::Collection(tag, _) => {
                let raw = read_reference(cursor)?;
                if !self.selected(field) {
                    return Ok(Value::Unresolved(raw));
                }
                self.reference_value(owner, field.name, raw, tag)?
            }
            FieldKind::Layer => {
                let raw = read_reference(cursor)?;
                self.reference_value(owner, field.name, raw, tags::LAYR)?
            }
            FieldKind::IndexList(tag, target) => {
                let raw = read_reference(cursor)?;
                if !self.selected(field) {
                    return Ok(Value::Unresolved(raw));
                }
                let indices = match self.reference_value(owner, field.name, raw, tag)? {
                    Value::List(values) => values.iter().filter_map(Value::as_u32).collect(),
                    _ => Vec::new(),
                };
                Value::Indices(RawIndices { target, indices })
            }
            FieldKind::Index(target, width) => Value::Index(RawIndex {
                target: Some(target),
                index: read_index(cursor, width)?,
            }),
            FieldKind::TypedIndex {
                selector,
                targets,
                width,
            } => {
                let code = record.get(selector).and_then(Value::as_u32);
                let target = targets
                    .iter()
                    .find(|(value, _)| Some(*value) == code)
                    .map(|(_, collection)| *collection);
                Value::Index(RawIndex {
                    target,
                    index: read_index(cursor, width)?,
                })
            }
            FieldKind::Anim(kind, hold_since) => {
                let track = anim::decode_track(self, owner, field.name, kind, hold_since, version, cursor)?;
                Value::Anim(Box::new(track))
            }
            kind => read_plain(cursor, kind)?,
        };
        Ok(value)
    }

    fn selected(&self, field: &FieldDef) -> bool {
        field
            .category
            .map_or(true, |category| self.import.includes(category))
    }

    /// Decodes the target of a reference field into the value that represents it
    pub(crate) fn reference_value(
        &mut self,
        owner: Tag,
        field: &str,
        raw: RawReference,
        tag: Tag,
    ) -> Result<Value> {
        let Some(reference) = self.reference(owner, field, raw, tag)? else {
            return Ok(crate::registry::empty_reference(tag));
        };
        if crate::registry::is_primitive(tag) {
            return self.decode_primitive(&reference);
        }
        Ok(Value::Records(self.resolve(&reference)?))
    }

    fn decode_primitive(&self, reference: &Reference) -> Result<Value> {
        let schema = self.registry.lookup(reference.tag, reference.version)?;
        let bytes = self
            .container
            .section_bytes(reference.index)
            .unwrap_or_default();
        let len = reference.count as usize * schema.record_size;
        let bytes = bytes.get(..len).ok_or_else(|| Error::TruncatedData {
            what: format!("section {} ({})", reference.index, reference.tag),
            end: u64::from(reference.offset) + len as u64,
            len: self.container.data().len() as u64,
        })?;

        let value = match reference.tag {
            tags::CHAR => {
                let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                Value::Text(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
            tags::U8 => Value::Bytes(bytes.to_vec()),
            _ => {
                let kind = schema.fields.first().map(|field| field.kind).ok_or_else(|| {
                    Error::UnsupportedVersion {
                        tag: reference.tag,
                        version: reference.version,
                        documented: "none".into(),
                    }
                })?;
                let mut cursor = Cursor::new(bytes);
                let values = (0..reference.count)
                    .map(|_| read_plain(&mut cursor, kind))
                    .collect::<Result<Vec<_>>>()?;
                Value::List(values)
            }
        };
        Ok(value)
    }
}

fn slice(section: &Section, count: u32) -> Section {
    if count as usize >= section.len() {
        Arc::clone(section)
    } else {
        Arc::new(section[..count as usize].to_vec())
    }
}

/// Guesses the size of records written by a newer layout than the registry documents
///
/// The smallest stride whose leftover is less than one alignment of padding wins.
fn infer_stride(bytes: &[u8], count: usize, record_size: usize) -> usize {
    if count == 0 {
        return record_size;
    }
    let fallback = (bytes.len() / count).max(record_size);
    (record_size..=bytes.len() / count)
        .find(|stride| {
            let used = stride * count;
            bytes.len() - used < SECTION_ALIGNMENT
                && bytes[used..].iter().all(|b| *b == PADDING_BYTE)
        })
        .unwrap_or(fallback)
}
