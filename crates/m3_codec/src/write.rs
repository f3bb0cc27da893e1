//! Types for writing M3 containers
//!

use binrw::BinWrite;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use crate::{
    anim,
    codec::{write_index, write_plain, write_reference},
    config::{DedupPolicy, ExportOptions, SectionReuse},
    error::{Error, Result},
    prune,
    read::ContainerKind,
    registry::{is_primitive, FieldDef, FieldKind, IndexWidth, Registry, Schema},
    scene::SceneGraph,
    types::{
        tags, Header, IndexEntry, RawReference, Tag, HEADER_SIZE, HEADER_VERSION, PADDING_BYTE,
        SECTION_ALIGNMENT,
    },
    value::{Collection, Record, Value},
};

/// M3 container generator
///
/// ```
/// # fn doit() -> m3_codec::error::Result<()>
/// # {
/// use m3_codec::{ContainerWriter, ExportOptions, Registry, SceneGraph};
/// use m3_codec::config::SectionReuse;
///
/// let registry = Registry::builtin();
/// let graph = SceneGraph {
///     kind: m3_codec::ContainerKind::Model,
///     root: registry.default_record(m3_codec::types::tags::MODL, 29)?,
///     collections: Default::default(),
/// };
///
/// let writer = ContainerWriter::new(registry, ExportOptions::builder()
///            .section_reuse(SectionReuse::Automatic)
///            .build());
/// let bytes = writer.encode(graph)?;
/// assert_eq!(&bytes[..4], b"43DM");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct ContainerWriter<'r> {
    registry: &'r Registry,
    options: ExportOptions,
}

impl<'r> ContainerWriter<'r> {
    pub fn new(registry: &'r Registry, options: ExportOptions) -> Self {
        ContainerWriter { registry, options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Runs the export passes over `graph` and lays out the container
    #[instrument(skip_all, err, fields(kind = %graph.kind))]
    pub fn encode(&self, mut graph: SceneGraph) -> Result<Vec<u8>> {
        self.prepare(&mut graph)?;
        let mut encoder = Encoder::new(self.registry, &self.options);
        let root = encoder.encode_root(graph)?;
        encoder.finish(root)
    }

    /// Encodes `graph` and replaces `path` with the result
    ///
    /// The container is staged next to `path` and only moved over it once it is complete,
    /// so a failed export leaves any existing file untouched.
    #[instrument(skip(self, graph), err)]
    pub fn write_to_path(&self, graph: SceneGraph, path: &Path) -> Result<()> {
        let bytes = self.encode(graph)?;
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(path)?;

        debug!(size = bytes.len(), "wrote container");
        Ok(())
    }

    fn prepare(&self, graph: &mut SceneGraph) -> Result<()> {
        prune::detach_unimported(graph);
        if graph.kind == ContainerKind::Model {
            if !self.options.output_anims {
                prune::strip_animations(graph);
            }
            if self.options.cull_unused_bones {
                prune::cull_unused_bones(graph)?;
            }
        }
        if self.options.use_only_max_bounds {
            prune::collapse_bounds(graph);
        }
        graph.validate()
    }
}

/// One section's records, ready to be placed
#[derive(Debug, Clone)]
struct Encoded {
    version: u32,
    count: u32,
    bytes: Vec<u8>,
    /// Byte ranges of reserved fields, for [`DedupPolicy::IgnoreReserved`]
    reserved: Vec<Range<usize>>,
}

struct PendingSection {
    tag: Tag,
    encoded: Encoded,
}

struct Encoder<'w> {
    registry: &'w Registry,
    options: &'w ExportOptions,
    sections: Vec<PendingSection>,
    interned: HashMap<(Tag, u32, Vec<u8>), RawReference>,
    blank_layers: HashMap<Vec<u8>, RawReference>,
    default_layers: HashMap<u32, Encoded>,
}

impl<'w> Encoder<'w> {
    fn new(registry: &'w Registry, options: &'w ExportOptions) -> Self {
        let header = PendingSection {
            tag: tags::MD34,
            encoded: Encoded {
                version: HEADER_VERSION,
                count: 1,
                bytes: vec![0; HEADER_SIZE],
                reserved: Vec::new(),
            },
        };
        Encoder {
            registry,
            options,
            sections: vec![header],
            interned: HashMap::new(),
            blank_layers: HashMap::new(),
            default_layers: HashMap::new(),
        }
    }

    fn encode_root(&mut self, graph: SceneGraph) -> Result<RawReference> {
        let SceneGraph {
            mut root,
            mut collections,
            ..
        } = graph;

        let def = self.registry.tag_def(root.tag).ok_or_else(|| Error::UnsupportedVersion {
            tag: root.tag,
            version: root.version,
            documented: "none".into(),
        })?;
        let version = self.target_version(root.tag, Some(&root))?;
        let schema = self.registry.lookup(root.tag, version)?;
        for field in def.fields {
            let FieldKind::Collection(_, collection) = field.kind else {
                continue;
            };
            let Some(records) = collections.remove(&collection) else {
                continue;
            };
            if !schema.fields.iter().any(|active| active.name == field.name) {
                if records.is_empty() {
                    continue;
                }
                return Err(Error::InvalidField {
                    tag: root.tag,
                    field: field.name.to_owned(),
                    expected: format!("no records before version {}", field.since),
                    found: format!("{} {collection} records at version {version}", records.len()),
                });
            }
            root.set(field.name, Value::Records(Arc::new(records)));
        }
        for collection in collections.keys() {
            warn!(%collection, tag = %root.tag, "collection has no field in the root record");
        }

        self.encode_section(root.tag, std::slice::from_ref(&root))
    }

    fn finish(self, root: RawReference) -> Result<Vec<u8>> {
        let too_large = || Error::CorruptContainer {
            reason: "container exceeds 4 GiB".into(),
        };
        let mut out = Cursor::new(Vec::new());
        let mut entries = Vec::with_capacity(self.sections.len());

        for section in &self.sections {
            let offset = u32::try_from(out.position()).map_err(|_| too_large())?;
            entries.push(IndexEntry {
                tag: section.tag,
                offset,
                count: section.encoded.count,
                version: section.encoded.version,
            });
            out.write_all(&section.encoded.bytes)?;
            pad(&mut out)?;
        }

        let index_offset = u32::try_from(out.position()).map_err(|_| too_large())?;
        for entry in &entries {
            entry.write(&mut out)?;
        }

        let header = Header {
            index_offset,
            index_count: u32::try_from(entries.len()).map_err(|_| too_large())?,
            root,
        };
        out.set_position(0);
        header.write(&mut out)?;

        debug!(sections = entries.len(), size = out.get_ref().len(), "laid out container");
        Ok(out.into_inner())
    }

    /// Version to write `tag` at: the option override, then the records' own, then the latest
    fn target_version(&self, tag: Tag, first: Option<&Record>) -> Result<u32> {
        self.options
            .target_version(tag)
            .or(first.map(|record| record.version))
            .or_else(|| self.registry.latest_version(tag))
            .ok_or_else(|| Error::UnsupportedVersion {
                tag,
                version: 0,
                documented: "none".into(),
            })
    }

    fn encode_section(&mut self, tag: Tag, records: &[Record]) -> Result<RawReference> {
        if records.is_empty() {
            return Ok(RawReference::NULL);
        }
        let encoded = self.encode_records(tag, records)?;
        Ok(self.emit(tag, encoded))
    }

    fn encode_records(&mut self, tag: Tag, records: &[Record]) -> Result<Encoded> {
        let version = self.target_version(tag, records.first())?;
        let mut schema = self.registry.lookup(tag, version)?;

        let passthrough = schema.is_newer() && records.iter().all(Record::is_pristine);
        if schema.is_newer() && !passthrough {
            warn!(
                %tag,
                version,
                layout = schema.layout_version,
                "records changed since decoding, writing the documented layout"
            );
            schema = self.registry.lookup(tag, schema.layout_version)?;
        }

        let mut out = Cursor::new(Vec::new());
        let mut reserved = Vec::new();
        for record in records {
            if record.tag != tag {
                return Err(Error::InvalidField {
                    tag,
                    field: "tag".into(),
                    expected: tag.to_string(),
                    found: record.tag.to_string(),
                });
            }
            self.encode_record(&schema, record, &mut out, &mut reserved)?;
            if passthrough {
                if let Some(opaque) = &record.opaque {
                    out.write_all(&opaque.trailing)?;
                }
            }
        }

        Ok(Encoded {
            version: schema.version,
            count: u32::try_from(records.len()).map_err(|_| Error::CorruptContainer {
                reason: format!("too many {tag} records"),
            })?,
            bytes: out.into_inner(),
            reserved,
        })
    }

    fn encode_record(
        &mut self,
        schema: &Schema,
        record: &Record,
        out: &mut Cursor<Vec<u8>>,
        reserved: &mut Vec<Range<usize>>,
    ) -> Result<()> {
        for field in &schema.fields {
            let fallback;
            let value = match record.get(field.name) {
                Some(value) => value,
                None => {
                    fallback = field.default_value(schema.version);
                    &fallback
                }
            };
            self.encode_field(schema, record, field, value, out, reserved)?;
        }
        Ok(())
    }

    fn encode_field(
        &mut self,
        schema: &Schema,
        record: &Record,
        field: &FieldDef,
        value: &Value,
        out: &mut Cursor<Vec<u8>>,
        reserved: &mut Vec<Range<usize>>,
    ) -> Result<()> {
        let owner = schema.tag;
        match field.kind {
            FieldKind::Reserved(_) => {
                let start = out.position() as usize;
                write_plain(out, owner, field.name, field.kind, value)?;
                reserved.push(start..out.position() as usize);
            }
            FieldKind::Ref(tag) | FieldKind::Collection(tag, _) => {
                let raw = self.encode_reference(owner, field.name, tag, value)?;
                write_reference(out, raw)?;
            }
            FieldKind::Layer => {
                let raw = self.encode_layer(owner, field.name, value)?;
                write_reference(out, raw)?;
            }
            FieldKind::IndexList(tag, collection) => {
                let raw = self.encode_index_list(owner, field.name, tag, collection, value)?;
                write_reference(out, raw)?;
            }
            FieldKind::Index(collection, width) => {
                let index = index_of(owner, field.name, Some(collection), width, value)?;
                write_index(out, width, index)?;
            }
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
                let index = index_of(owner, field.name, target, width, value)?;
                write_index(out, width, index)?;
            }
            FieldKind::Anim(kind, hold_since) => {
                let track = value.as_anim().ok_or_else(|| mismatch(owner, field.name, "animation track", value))?;
                let keys = if anim::has_keys(track) {
                    let bytes = anim::encode_keys(owner, field.name, kind, &track.keys)?;
                    let encoded = Encoded {
                        version: self.target_version(kind.keys_tag(), None)?,
                        count: track.keys.len() as u32,
                        bytes,
                        reserved: Vec::new(),
                    };
                    self.emit(kind.keys_tag(), encoded)
                } else {
                    RawReference::NULL
                };
                anim::write_header(
                    out,
                    owner,
                    field.name,
                    kind,
                    hold_since,
                    schema.layout_version,
                    track,
                    keys,
                )?;
            }
            kind => write_plain(out, owner, field.name, kind, value)?,
        }
        Ok(())
    }

    fn encode_reference(
        &mut self,
        owner: Tag,
        field: &str,
        tag: Tag,
        value: &Value,
    ) -> Result<RawReference> {
        match value {
            Value::Unresolved(raw) => {
                if !raw.is_null() {
                    warn!(%owner, field, "reference was not imported, writing it as empty");
                }
                Ok(RawReference::NULL)
            }
            Value::Records(section) if !is_primitive(tag) => self.encode_section(tag, section),
            Value::Text(text) if tag == tags::CHAR => {
                if text.is_empty() {
                    return Ok(RawReference::NULL);
                }
                let mut bytes = text.as_bytes().to_vec();
                bytes.push(0);
                Ok(self.emit_primitive(tag, bytes.len(), bytes)?)
            }
            Value::Bytes(bytes) if tag == tags::U8 => {
                if bytes.is_empty() {
                    return Ok(RawReference::NULL);
                }
                Ok(self.emit_primitive(tag, bytes.len(), bytes.clone())?)
            }
            Value::List(values) if is_primitive(tag) => self.encode_list(tag, field, values),
            other => Err(mismatch(owner, field, &format!("reference to {tag}"), other)),
        }
    }

    fn encode_list(&mut self, tag: Tag, field: &str, values: &[Value]) -> Result<RawReference> {
        if values.is_empty() {
            return Ok(RawReference::NULL);
        }
        let version = self.target_version(tag, None)?;
        let kind = self
            .registry
            .lookup(tag, version)?
            .fields
            .first()
            .map(|def| def.kind)
            .ok_or_else(|| Error::UnsupportedVersion {
                tag,
                version,
                documented: "none".into(),
            })?;

        let mut bytes = Vec::new();
        for value in values {
            write_plain(&mut bytes, tag, field, kind, value)?;
        }
        self.emit_primitive(tag, values.len(), bytes)
    }

    fn emit_primitive(&mut self, tag: Tag, count: usize, bytes: Vec<u8>) -> Result<RawReference> {
        let encoded = Encoded {
            version: self.target_version(tag, None)?,
            count: u32::try_from(count).map_err(|_| Error::CorruptContainer {
                reason: format!("too many {tag} values"),
            })?,
            bytes,
            reserved: Vec::new(),
        };
        Ok(self.emit(tag, encoded))
    }

    fn encode_index_list(
        &mut self,
        owner: Tag,
        field: &str,
        tag: Tag,
        collection: Collection,
        value: &Value,
    ) -> Result<RawReference> {
        let indices: Vec<Value> = match value {
            Value::Unresolved(raw) => {
                if !raw.is_null() {
                    warn!(%owner, field, "reference was not imported, writing it as empty");
                }
                return Ok(RawReference::NULL);
            }
            Value::Handles(handles) => handles
                .iter()
                .map(|handle| {
                    if handle.collection == collection {
                        Ok(Value::U32(handle.index))
                    } else {
                        Err(mismatch(owner, field, &format!("handles into {collection}"), value))
                    }
                })
                .collect::<Result<_>>()?,
            Value::Indices(raw) => raw.indices.iter().map(|i| Value::U32(*i)).collect(),
            other => return Err(mismatch(owner, field, "index list", other)),
        };
        self.encode_list(tag, field, &indices)
    }

    /// Points a material layer slot at a section
    ///
    /// Blank slots share one section when culling is on. Otherwise an empty slot gets its
    /// own default layer.
    fn encode_layer(&mut self, owner: Tag, field: &str, value: &Value) -> Result<RawReference> {
        let records = match value {
            Value::Records(section) => section.as_slice(),
            Value::Unresolved(_) => return self.encode_reference(owner, field, tags::LAYR, value),
            other => return Err(mismatch(owner, field, "material layer", other)),
        };
        let cull = self.options.cull_material_layers;

        if records.is_empty() {
            let version = self.target_version(tags::LAYR, None)?;
            let blank = self.default_layer(version)?;
            return Ok(if cull {
                self.shared_blank(blank)
            } else {
                self.emit(tags::LAYR, blank)
            });
        }

        let encoded = self.encode_records(tags::LAYR, records)?;
        if cull && records.len() == 1 {
            let blank = self.default_layer(encoded.version)?;
            if blank.bytes == encoded.bytes {
                return Ok(self.shared_blank(encoded));
            }
        }
        Ok(self.emit(tags::LAYR, encoded))
    }

    fn default_layer(&mut self, version: u32) -> Result<Encoded> {
        if let Some(encoded) = self.default_layers.get(&version) {
            return Ok(encoded.clone());
        }
        let record = self.registry.default_record(tags::LAYR, version)?;
        let encoded = self.encode_records(tags::LAYR, std::slice::from_ref(&record))?;
        self.default_layers.insert(version, encoded.clone());
        Ok(encoded)
    }

    fn shared_blank(&mut self, encoded: Encoded) -> RawReference {
        if let Some(raw) = self.blank_layers.get(&encoded.bytes) {
            return *raw;
        }
        let key = encoded.bytes.clone();
        let raw = self.push(tags::LAYR, encoded);
        self.blank_layers.insert(key, raw);
        raw
    }

    /// Places a section, or finds an equal one under automatic reuse
    fn emit(&mut self, tag: Tag, encoded: Encoded) -> RawReference {
        if self.options.section_reuse == SectionReuse::Explicit {
            return self.push(tag, encoded);
        }
        let key = (tag, encoded.version, dedup_key(self.options.dedup_policy, &encoded));
        if let Some(raw) = self.interned.get(&key) {
            return *raw;
        }
        let raw = self.push(tag, encoded);
        self.interned.insert(key, raw);
        raw
    }

    fn push(&mut self, tag: Tag, encoded: Encoded) -> RawReference {
        let raw = RawReference {
            index: self.sections.len() as u32,
            count: encoded.count,
            version: encoded.version,
        };
        self.sections.push(PendingSection { tag, encoded });
        raw
    }
}

fn dedup_key(policy: DedupPolicy, encoded: &Encoded) -> Vec<u8> {
    let mut key = encoded.bytes.clone();
    if policy == DedupPolicy::IgnoreReserved {
        for range in &encoded.reserved {
            key[range.clone()].fill(0);
        }
    }
    key
}

fn pad(out: &mut Cursor<Vec<u8>>) -> Result<()> {
    let rem = out.position() as usize % SECTION_ALIGNMENT;
    if rem != 0 {
        out.write_all(&[PADDING_BYTE; SECTION_ALIGNMENT][..SECTION_ALIGNMENT - rem])?;
    }
    Ok(())
}

fn mismatch(tag: Tag, field: &str, expected: &str, found: &Value) -> Error {
    Error::InvalidField {
        tag,
        field: field.to_owned(),
        expected: expected.to_owned(),
        found: found.kind_name().to_owned(),
    }
}

fn index_of(
    owner: Tag,
    field: &str,
    target: Option<Collection>,
    width: IndexWidth,
    value: &Value,
) -> Result<Option<u32>> {
    let index = match value {
        Value::Handle(None) => None,
        Value::Handle(Some(handle)) => {
            if Some(handle.collection) != target {
                let expected = target.map_or("no handle".to_owned(), |c| format!("handle into {c}"));
                return Err(Error::InvalidField {
                    tag: owner,
                    field: field.to_owned(),
                    expected,
                    found: format!("handle into {}", handle.collection),
                });
            }
            Some(handle.index)
        }
        Value::Index(raw) => raw.index,
        other => return Err(mismatch(owner, field, "index", other)),
    };
    if let Some(i) = index.filter(|i| *i > width.max_index()) {
        return Err(Error::InvalidField {
            tag: owner,
            field: field.to_owned(),
            expected: format!("index up to {}", width.max_index()),
            found: i.to_string(),
        });
    }
    Ok(index)
}
