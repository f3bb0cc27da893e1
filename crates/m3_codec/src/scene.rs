//! The assembled, handle based model

use std::collections::BTreeMap;

use crate::{
    error::{Error, Result},
    read::ContainerKind,
    value::{Collection, Handle, Record, Value},
};

/// A model with every top-level list pulled out of the root record
///
/// Every cross-record link is a [`Handle`] into one of `collections`. Collections that were
/// not imported are absent from the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SceneGraph {
    pub kind: ContainerKind,
    /// The `MODL` or `ANIM` record, without its collection fields
    pub root: Record,
    pub collections: BTreeMap<Collection, Vec<Record>>,
}

impl SceneGraph {
    pub fn collection(&self, collection: Collection) -> Option<&[Record]> {
        self.collections.get(&collection).map(Vec::as_slice)
    }

    pub fn collection_mut(&mut self, collection: Collection) -> Option<&mut Vec<Record>> {
        self.collections.get_mut(&collection)
    }

    pub fn get(&self, handle: Handle) -> Option<&Record> {
        self.collection(handle.collection)?
            .get(handle.index as usize)
    }

    pub fn bones(&self) -> &[Record] {
        self.collection(Collection::Bones).unwrap_or_default()
    }

    pub fn particle_systems(&self) -> &[Record] {
        self.collection(Collection::ParticleSystems)
            .unwrap_or_default()
    }

    /// Visits the root and every record of every collection, nested records included
    pub fn for_each_record(&self, f: &mut dyn FnMut(&Record)) {
        self.root.walk(f);
        for records in self.collections.values() {
            for record in records {
                record.walk(f);
            }
        }
    }

    pub fn for_each_record_mut(&mut self, f: &mut dyn FnMut(&mut Record)) {
        self.root.walk_mut(f);
        for records in self.collections.values_mut() {
            for record in records {
                record.walk_mut(f);
            }
        }
    }

    /// Checks that every handle points inside its collection
    pub fn validate(&self) -> Result<()> {
        let lengths: BTreeMap<Collection, usize> = self
            .collections
            .iter()
            .map(|(collection, records)| (*collection, records.len()))
            .collect();

        let mut failure = None;
        let mut check = |record: &Record| {
            if failure.is_some() {
                return;
            }
            for (name, value) in &record.fields {
                let handles = match value {
                    Value::Handle(Some(handle)) => std::slice::from_ref(handle),
                    Value::Handles(handles) => handles.as_slice(),
                    _ => continue,
                };
                let bad = handles.iter().find(|handle| {
                    lengths
                        .get(&handle.collection)
                        .map_or(true, |len| handle.index as usize >= *len)
                });
                if let Some(handle) = bad {
                    failure = Some(Error::DanglingReference {
                        record: record.tag.to_string(),
                        field: (*name).to_owned(),
                        index: handle.index,
                        target: handle.collection.to_string(),
                    });
                    return;
                }
            }
        };
        self.for_each_record(&mut check);

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Rewrites every handle into `collection` through `map`, old index to new index
    ///
    /// Handles whose record was removed become null. Lists drop them.
    pub fn remap(&mut self, collection: Collection, map: &[Option<u32>]) {
        let lookup = |index: u32| map.get(index as usize).copied().flatten();
        self.for_each_record_mut(&mut |record| {
            for value in record.fields.values_mut() {
                match value {
                    Value::Handle(slot @ Some(_)) => {
                        if let Some(handle) = slot.filter(|h| h.collection == collection) {
                            *slot = lookup(handle.index).map(|index| Handle::new(collection, index));
                        }
                    }
                    Value::Handles(handles) => {
                        *handles = handles
                            .iter()
                            .filter_map(|handle| {
                                if handle.collection != collection {
                                    return Some(*handle);
                                }
                                lookup(handle.index).map(|index| Handle::new(collection, index))
                            })
                            .collect();
                    }
                    _ => {}
                }
            }
        });
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    use super::SceneGraph;
    use crate::error::{ErrorKind, Result};
    use crate::read::ContainerKind;
    use crate::types::tags;
    use crate::value::{Collection, Handle, Record, Value};

    fn bone(parent: Option<u32>) -> Record {
        Record::new(tags::BONE, 1).with(
            "parent",
            Value::Handle(parent.map(|index| Handle::new(Collection::Bones, index))),
        )
    }

    fn graph() -> SceneGraph {
        let attachment = Record::new(tags::ATT, 1)
            .with("bone", Value::Handle(Some(Handle::new(Collection::Bones, 2))));
        SceneGraph {
            kind: ContainerKind::Model,
            root: Record::new(tags::MODL, 29),
            collections: BTreeMap::from([
                (Collection::Bones, vec![bone(None), bone(Some(0)), bone(Some(0))]),
                (Collection::AttachmentPoints, vec![attachment]),
            ]),
        }
    }

    #[test]
    fn lookup_by_handle() {
        let graph = graph();
        assert_eq!(graph.bones().len(), 3);
        assert!(graph.particle_systems().is_empty());
        let parent = graph.bones()[1].handle("parent");
        assert_eq!(parent, Some(Handle::new(Collection::Bones, 0)));
        assert_eq!(graph.get(Handle::new(Collection::Bones, 5)), None);
    }

    #[test]
    fn validate_reports_the_offending_field() -> Result<()> {
        let mut graph = graph();
        graph.validate()?;

        graph
            .collection_mut(Collection::Bones)
            .expect("bones are present")
            .pop();
        let err = graph.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DanglingReference);
        assert_eq!(err.to_string(), "ATT_.bone refers to index 2 of Bones");
        Ok(())
    }

    #[test]
    fn remap_moves_and_clears_handles() -> Result<()> {
        let mut graph = graph();
        graph
            .collection_mut(Collection::Bones)
            .expect("bones are present")
            .remove(1);
        graph.remap(Collection::Bones, &[Some(0), None, Some(1)]);
        graph.validate()?;

        let attachment = &graph.collection(Collection::AttachmentPoints).expect("present")[0];
        assert_eq!(attachment.handle("bone"), Some(Handle::new(Collection::Bones, 1)));
        Ok(())
    }
}
