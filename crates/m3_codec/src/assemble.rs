//! Turning a resolved root record into a [`SceneGraph`]

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    registry::{FieldKind, Registry},
    resolve::ResolvedModel,
    scene::SceneGraph,
    value::{Collection, Handle, RawIndex, Record, Value},
};

pub struct Assembler<'r> {
    registry: &'r Registry,
}

impl<'r> Assembler<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Assembler { registry }
    }

    /// Moves the collections out of the root record and validates every index into them
    ///
    /// Collections that were not imported stay on the root as unresolved references, and
    /// indices into them are kept as they were read.
    #[instrument(skip_all, err)]
    pub fn assemble(&self, model: ResolvedModel) -> Result<SceneGraph> {
        let mut root = model.root;
        let schema = self.registry.lookup(root.tag, root.version)?;

        let mut collections = BTreeMap::new();
        for field in &schema.fields {
            let FieldKind::Collection(_, collection) = field.kind else {
                continue;
            };
            // unimported collections stay behind as placeholders for the writer
            if matches!(root.get(field.name), Some(Value::Unresolved(_))) {
                continue;
            }
            match root.fields.shift_remove(field.name) {
                Some(Value::Records(section)) => {
                    let records = Arc::try_unwrap(section).unwrap_or_else(|shared| (*shared).clone());
                    collections.insert(collection, records);
                }
                None => {}
                Some(other) => {
                    return Err(Error::InvalidField {
                        tag: root.tag,
                        field: field.name.to_owned(),
                        expected: "records".into(),
                        found: other.kind_name().into(),
                    })
                }
            }
        }

        let lengths: BTreeMap<Collection, usize> = collections
            .iter()
            .map(|(collection, records): (&Collection, &Vec<Record>)| (*collection, records.len()))
            .collect();

        let root_label = root.tag.to_string();
        link(&mut root, &root_label, &lengths)?;
        for (collection, records) in collections.iter_mut() {
            for (i, record) in records.iter_mut().enumerate() {
                link(record, &format!("{collection}[{i}]"), &lengths)?;
            }
        }

        let mut graph = SceneGraph {
            kind: model.kind,
            root,
            collections,
        };
        graph.for_each_record_mut(&mut |record| {
            if let Some(opaque) = record.opaque.as_mut() {
                opaque.pristine = Some(record.fields.clone());
            }
        });

        debug!(collections = graph.collections.len(), "assembled scene graph");
        Ok(graph)
    }
}

/// Converts the raw indices of `record` and the records nested in it into handles
fn link(record: &mut Record, label: &str, lengths: &BTreeMap<Collection, usize>) -> Result<()> {
    for (name, value) in record.fields.iter_mut() {
        let dangling = |index: u32, target: String| Error::DanglingReference {
            record: label.to_owned(),
            field: (*name).to_owned(),
            index,
            target,
        };

        match value {
            Value::Index(RawIndex {
                target: Some(collection),
                index,
            }) => {
                let (collection, index) = (*collection, *index);
                let Some(len) = lengths.get(&collection) else {
                    continue;
                };
                let handle = match index {
                    Some(i) if (i as usize) < *len => Some(Handle::new(collection, i)),
                    Some(i) => return Err(dangling(i, collection.to_string())),
                    None => None,
                };
                *value = Value::Handle(handle);
            }
            Value::Index(RawIndex {
                target: None,
                index,
            }) => match *index {
                Some(i) => return Err(dangling(i, "an unknown collection".into())),
                None => *value = Value::Handle(None),
            },
            Value::Indices(raw) => {
                let Some(len) = lengths.get(&raw.target) else {
                    continue;
                };
                if let Some(bad) = raw.indices.iter().find(|i| **i as usize >= *len) {
                    return Err(dangling(*bad, raw.target.to_string()));
                }
                let target = raw.target;
                let handles = raw
                    .indices
                    .iter()
                    .map(|i| Handle::new(target, *i))
                    .collect();
                *value = Value::Handles(handles);
            }
            Value::Records(section) => {
                let nested = format!("{label}/{name}");
                for record in Arc::make_mut(section).iter_mut() {
                    link(record, &nested, lengths)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}
