//! Graph passes the writer runs before encoding

use std::collections::BTreeSet;
use tracing::{debug, instrument, warn};

use crate::{
    error::Result,
    scene::SceneGraph,
    value::{Collection, Handle, Keyframe, RawIndex, Value},
};

/// Nulls indices into collections the graph does not hold
///
/// Such indices survive a partial import as they were read. The collections they point
/// into are written empty, so the indices would dangle. Returns the number of fields
/// cleared.
pub fn detach_unimported(graph: &mut SceneGraph) -> usize {
    let present: BTreeSet<Collection> = graph.collections.keys().copied().collect();
    let mut cleared = 0;
    graph.for_each_record_mut(&mut |record| {
        let tag = record.tag;
        for (name, value) in record.fields.iter_mut() {
            let target = match value {
                Value::Index(RawIndex {
                    target: Some(target),
                    index: Some(_),
                }) => *target,
                Value::Indices(raw) if !raw.indices.is_empty() => raw.target,
                _ => continue,
            };
            if present.contains(&target) {
                continue;
            }
            warn!(%tag, field = *name, %target, "index into a collection that was not imported, writing it as empty");
            let emptied = if matches!(value, Value::Indices(_)) {
                Value::Handles(Vec::new())
            } else {
                Value::Handle(None)
            };
            *value = emptied;
            cleared += 1;
        }
    });
    cleared
}

/// Removes sequences and every keyframe, leaving each track at its current value
pub fn strip_animations(graph: &mut SceneGraph) {
    if let Some(sequences) = graph.collection_mut(Collection::Sequences) {
        sequences.clear();
    }
    graph.for_each_record_mut(&mut |record| {
        for value in record.fields.values_mut() {
            if let Some(track) = value.as_anim_mut() {
                track.keys.clear();
            }
        }
    });
}

fn bone_handles(value: &Value) -> &[Handle] {
    match value {
        Value::Handle(Some(handle)) if handle.collection == Collection::Bones => {
            std::slice::from_ref(handle)
        }
        Value::Handles(handles) => handles.as_slice(),
        _ => &[],
    }
}

/// Removes bones that nothing refers to
///
/// A bone is kept when a record other than a bone points at it, when it is animated, or
/// when it is an ancestor of a kept bone. Rest matrices parallel to the bones are
/// filtered with them. Returns the number of bones removed.
#[instrument(skip_all, err)]
pub fn cull_unused_bones(graph: &mut SceneGraph) -> Result<usize> {
    let bones = graph.bones();
    if bones.is_empty() {
        return Ok(0);
    }

    let mut used = BTreeSet::new();
    for (i, bone) in bones.iter().enumerate() {
        if bone.is_animated() {
            used.insert(i as u32);
        }
    }
    let mut mark = |record: &crate::value::Record| {
        for value in record.fields.values() {
            for handle in bone_handles(value) {
                if handle.collection == Collection::Bones {
                    used.insert(handle.index);
                }
            }
        }
    };
    graph.root.walk(&mut mark);
    for (collection, records) in &graph.collections {
        if *collection == Collection::Bones {
            continue;
        }
        for record in records {
            record.walk(&mut mark);
        }
    }

    for start in used.clone() {
        let mut current = start;
        let mut seen = BTreeSet::from([current]);
        while let Some(parent) = bones
            .get(current as usize)
            .and_then(|bone| bone.handle("parent"))
        {
            if !seen.insert(parent.index) {
                break;
            }
            used.insert(parent.index);
            current = parent.index;
        }
    }

    let total = bones.len();
    if used.len() >= total {
        return Ok(0);
    }

    let mut next = 0;
    let map: Vec<Option<u32>> = (0..total as u32)
        .map(|i| {
            used.contains(&i).then(|| {
                next += 1;
                next - 1
            })
        })
        .collect();

    for collection in [Collection::Bones, Collection::RestMatrices] {
        let Some(records) = graph.collection_mut(collection) else {
            continue;
        };
        if records.len() != total {
            continue;
        }
        let mut i = 0;
        records.retain(|_| {
            i += 1;
            map[i - 1].is_some()
        });
    }
    graph.remap(Collection::Bones, &map);
    graph.validate()?;

    let removed = total - used.len();
    debug!(removed, kept = used.len(), "culled unused bones");
    Ok(removed)
}

/// Replaces every multi-key bounds track with one key spanning all of them
pub fn collapse_bounds(graph: &mut SceneGraph) {
    graph.for_each_record_mut(&mut |record| {
        for value in record.fields.values_mut() {
            let Some(track) = value.as_anim_mut() else {
                continue;
            };
            if track.keys.len() < 2 {
                continue;
            }
            let mut union = None;
            for key in &track.keys {
                if let Value::Bounds(bounds) = &key.value {
                    union = Some(match union {
                        None => *bounds,
                        Some(acc) => bounds.union(&acc),
                    });
                }
            }
            let (Some(union), Some(time)) = (union, track.keys.iter().map(|k| k.time).min()) else {
                continue;
            };
            track.keys = vec![Keyframe {
                time,
                value: Value::Bounds(union),
            }];
        }
    });
}
