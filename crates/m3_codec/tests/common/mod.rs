#![allow(dead_code)]

use m3_codec::types::{tags, Tag};
use m3_codec::value::{AnimTrack, Collection, Handle, Keyframe, Record, Value};
use m3_codec::{Container, ContainerKind, Registry, SceneGraph};

pub fn record(tag: Tag, version: u32) -> Record {
    Registry::builtin()
        .default_record(tag, version)
        .expect("layout is documented")
}

pub fn model(collections: impl IntoIterator<Item = (Collection, Vec<Record>)>) -> SceneGraph {
    SceneGraph {
        kind: ContainerKind::Model,
        root: record(tags::MODL, 29).with("name", Value::Text("fixture".into())),
        collections: collections.into_iter().collect(),
    }
}

pub fn bone(name: &str, parent: Option<u32>) -> Record {
    record(tags::BONE, 1)
        .with("name", Value::Text(name.into()))
        .with(
            "parent",
            Value::Handle(parent.map(|index| Handle::new(Collection::Bones, index))),
        )
}

pub fn attachment(name: &str, bone: u32) -> Record {
    record(tags::ATT, 1)
        .with("name", Value::Text(name.into()))
        .with("bone", Value::Handle(Some(Handle::new(Collection::Bones, bone))))
}

pub fn layer(image: &str) -> Value {
    let layer = record(tags::LAYR, 26).with("image_path", Value::Text(image.into()));
    Value::Records(vec![layer].into())
}

/// A linear track resting at the first key's value
pub fn track(keys: &[(i32, Value)]) -> Value {
    let mut track = AnimTrack::constant(keys[0].1.clone());
    track.keys = keys
        .iter()
        .map(|(time, value)| Keyframe {
            time: *time,
            value: value.clone(),
        })
        .collect();
    Value::Anim(Box::new(track))
}

pub fn count_sections(bytes: &[u8], tag: Tag) -> usize {
    Container::read(bytes, Registry::builtin())
        .expect("container is readable")
        .entries()
        .iter()
        .filter(|entry| entry.tag == tag)
        .count()
}

/// Rewrites the version of every index entry of `tag`
pub fn patch_entry_version(bytes: &mut [u8], tag: Tag, version: u32) {
    let (offset, positions): (usize, Vec<usize>) = {
        let container = Container::read(bytes, Registry::builtin()).expect("container is readable");
        let positions = container
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.tag == tag)
            .map(|(i, _)| i)
            .collect();
        (container.header().index_offset as usize, positions)
    };
    for i in positions {
        let at = offset + i * 16 + 12;
        bytes[at..at + 4].copy_from_slice(&version.to_le_bytes());
    }
}

/// Renames every index entry of `from` to `to`
pub fn patch_entry_tag(bytes: &mut [u8], from: Tag, to: Tag) {
    let (offset, positions): (usize, Vec<usize>) = {
        let container = Container::read(bytes, Registry::builtin()).expect("container is readable");
        let positions = container
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.tag == from)
            .map(|(i, _)| i)
            .collect();
        (container.header().index_offset as usize, positions)
    };
    for i in positions {
        let at = offset + i * 16;
        bytes[at..at + 4].copy_from_slice(&to.to_wire());
    }
}
