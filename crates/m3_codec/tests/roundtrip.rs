mod common;

use common::{attachment, bone, layer, model, record, track};
use m3_codec::error::{ErrorKind, Result};
use m3_codec::registry::FieldKind;
use m3_codec::types::{tags, Tag};
use m3_codec::value::{Collection, Handle, RawIndex, Record, Value};
use m3_codec::{decode, encode, ContainerKind, ExportOptions, ImportOptions, Registry, SceneGraph};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn unit() -> SceneGraph {
    let arm = bone("arm", Some(0)).with(
        "rotation",
        track(&[
            (0, Value::Quat([0.0, 0.0, 0.0, 1.0])),
            (500, Value::Quat([0.0, 0.0, 0.707_106_77, 0.707_106_77])),
        ]),
    );
    let sequence = record(tags::SEQS, 2)
        .with("name", Value::Text("Stand".into()))
        .with("end", Value::U32(1000));
    let material_ref = record(tags::MATM, 0).with(
        "material_index",
        Value::Handle(Some(Handle::new(Collection::StandardMaterials, 0))),
    );
    let material = record(tags::MAT, 20)
        .with("name", Value::Text("skin".into()))
        .with("layer_diffuse", layer("skin.dds"));
    let emitter = record(tags::PAR, 24)
        .with("bone", Value::Handle(Some(Handle::new(Collection::Bones, 1))))
        .with(
            "material_ref",
            Value::Handle(Some(Handle::new(Collection::MaterialRefs, 0))),
        );

    model([
        (Collection::Sequences, vec![sequence]),
        (Collection::Bones, vec![bone("root", None), arm]),
        (Collection::RestMatrices, vec![record(tags::IREF, 0), record(tags::IREF, 0)]),
        (Collection::AttachmentPoints, vec![attachment("ref_hardpoint", 1)]),
        (Collection::MaterialRefs, vec![material_ref]),
        (Collection::StandardMaterials, vec![material]),
        (Collection::ParticleSystems, vec![emitter]),
    ])
}

#[traced_test]
#[test]
fn resave_is_stable() -> Result<()> {
    let options = ExportOptions::default();
    let first = encode(unit(), &options)?;
    let decoded = decode(&first, &ImportOptions::default())?;
    let second = encode(decoded.clone(), &options)?;

    assert_eq!(first, second);
    assert_eq!(decode(&second, &ImportOptions::default())?, decoded);
    Ok(())
}

#[traced_test]
#[test]
fn decoded_unit_keeps_its_links() -> Result<()> {
    let graph = decode(&encode(unit(), &ExportOptions::default())?, &ImportOptions::default())?;

    assert_eq!(graph.root.text("name"), Some("fixture"));
    let sequences = graph.collection(Collection::Sequences).expect("imported");
    assert_eq!(sequences[0].text("name"), Some("Stand"));
    assert_eq!(sequences[0].get("end"), Some(&Value::U32(1000)));

    let rotation = graph.bones()[1].anim("rotation").expect("track is decoded");
    assert_eq!(rotation.keys.len(), 2);
    assert_eq!(rotation.keys[1].time, 500);

    let emitter = &graph.particle_systems()[0];
    let material_ref = emitter.handle("material_ref").expect("linked");
    let material = graph
        .get(material_ref)
        .and_then(|r| r.handle("material_index"))
        .and_then(|handle| graph.get(handle))
        .expect("material is linked");
    assert_eq!(material.text("name"), Some("skin"));
    let diffuse = material.records("layer_diffuse").expect("layer slot");
    assert_eq!(diffuse[0].text("image_path"), Some("skin.dds"));
    Ok(())
}

fn trail_systems(third: Value) -> SceneGraph {
    let mut systems = vec![record(tags::PAR, 24), record(tags::PAR, 24), record(tags::PAR, 24)];
    systems[2].set("trail_system", third);
    model([(Collection::ParticleSystems, systems)])
}

#[traced_test]
#[test]
fn trail_index_links_particle_systems() -> Result<()> {
    let trail = Value::Handle(Some(Handle::new(Collection::ParticleSystems, 1)));
    let graph = decode(
        &encode(trail_systems(trail), &ExportOptions::default())?,
        &ImportOptions::default(),
    )?;

    let systems = graph.particle_systems();
    assert_eq!(systems.len(), 3);
    let handle = systems[2].handle("trail_system").expect("linked");
    assert_eq!(handle, Handle::new(Collection::ParticleSystems, 1));
    assert_eq!(graph.get(handle), Some(&systems[1]));
    assert_eq!(systems[0].handle("trail_system"), None);
    Ok(())
}

#[traced_test]
#[test]
fn trail_index_past_the_end_is_dangling() -> Result<()> {
    let raw = Value::Index(RawIndex {
        target: Some(Collection::ParticleSystems),
        index: Some(3),
    });
    let bytes = encode(trail_systems(raw), &ExportOptions::default())?;

    let err = decode(&bytes, &ImportOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DanglingReference);
    assert_eq!(
        err.to_string(),
        "ParticleSystems[2].trail_system refers to index 3 of ParticleSystems"
    );

    let handle = Value::Handle(Some(Handle::new(Collection::ParticleSystems, 3)));
    let err = encode(trail_systems(handle), &ExportOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DanglingReference);
    Ok(())
}

#[traced_test]
#[test]
fn animation_container_round_trip() -> Result<()> {
    let walk = record(tags::BONE, 1).with(
        "location",
        track(&[(0, Value::Vec3([0.0; 3])), (333, Value::Vec3([0.0, 1.0, 0.0]))]),
    );
    let graph = SceneGraph {
        kind: m3_codec::ContainerKind::Animation,
        root: record(tags::ANIM, 1).with("name", Value::Text("Walk".into())),
        collections: [
            (Collection::Sequences, vec![record(tags::SEQS, 2)]),
            (Collection::Bones, vec![walk, record(tags::BONE, 1)]),
        ]
        .into_iter()
        .collect(),
    };

    // animation containers are never culled and ignore import selections
    let bytes = encode(graph.clone(), &ExportOptions::default())?;
    let nothing = ImportOptions::builder()
        .include_rig(false)
        .include_animations(false)
        .build();
    let decoded = decode(&bytes, &nothing)?;

    assert_eq!(decoded.kind, m3_codec::ContainerKind::Animation);
    assert_eq!(decoded.bones().len(), 2);
    assert_eq!(decoded.bones()[0].anim("location").map(|t| t.keys.len()), Some(2));
    assert_eq!(encode(decoded, &ExportOptions::default())?, bytes);
    Ok(())
}

/// Gives every material layer slot of `record` a default layer, the form decoding produces
fn with_layers(mut record: Record) -> Result<Record> {
    let schema = Registry::builtin().lookup(record.tag, record.version)?;
    for field in schema.fields.iter().filter(|field| field.kind == FieldKind::Layer) {
        record.set(field.name, Value::Records(vec![record_at(tags::LAYR, 26)?].into()));
    }
    Ok(record)
}

fn record_at(tag: Tag, version: u32) -> Result<Record> {
    with_layers(Registry::builtin().default_record(tag, version)?)
}

/// A container holding one default record of `tag` at `version`, and where to find it
fn host(tag: Tag, version: u32) -> Result<Option<(SceneGraph, Option<Collection>)>> {
    let registry = Registry::builtin();
    let placed = |collection, record| Some((model([(collection, vec![record])]), Some(collection)));

    let graph = match tag {
        tags::MODL => Some((
            SceneGraph {
                kind: ContainerKind::Model,
                root: record_at(tag, version)?,
                collections: Default::default(),
            },
            None,
        )),
        tags::ANIM => Some((
            SceneGraph {
                kind: ContainerKind::Animation,
                root: record_at(tag, version)?,
                collections: Default::default(),
            },
            None,
        )),
        tags::LAYR => placed(
            Collection::StandardMaterials,
            record_at(tags::MAT, 20)?.with(
                "layer_diffuse",
                Value::Records(vec![record_at(tag, version)?].into()),
            ),
        ),
        tags::CMS => placed(
            Collection::CompositeMaterials,
            record_at(tags::CMP, 2)?.with("sections", Value::Records(vec![record_at(tag, version)?].into())),
        ),
        tags::PHSH => placed(
            Collection::RigidBodies,
            record_at(tags::PHRB, 4)?.with("shapes", Value::Records(vec![record_at(tag, version)?].into())),
        ),
        _ => {
            let root = registry.lookup(tags::MODL, 29)?;
            let collection = root.fields.iter().find_map(|field| match field.kind {
                FieldKind::Collection(t, collection) if t == tag => Some(collection),
                _ => None,
            });
            match collection {
                Some(collection) => placed(collection, record_at(tag, version)?),
                None => None,
            }
        }
    };
    Ok(graph)
}

#[test]
fn every_documented_layout_round_trips() -> Result<()> {
    let registry = Registry::builtin();
    let export = ExportOptions::builder().cull_unused_bones(false).build();
    let import = ImportOptions::default();
    let mut covered = 0;

    for tag in registry.tags() {
        let def = registry.tag_def(tag).expect("tag listed by the registry");
        for &version in def.versions {
            let Some((graph, collection)) = host(tag, version)? else {
                continue;
            };
            let first = encode(graph.clone(), &export)?;
            let decoded = decode(&first, &import)?;
            let second = encode(decoded.clone(), &export)?;
            assert_eq!(first, second, "{tag} v{version} is not byte stable");
            assert_eq!(decode(&second, &import)?, decoded, "{tag} v{version} changed on resave");

            match collection {
                Some(collection) => assert_eq!(
                    decoded.collection(collection),
                    graph.collection(collection),
                    "{tag} v{version} did not survive encoding"
                ),
                None => {
                    assert_eq!(decoded.root.version, version);
                    for (name, value) in &decoded.root.fields {
                        assert_eq!(graph.root.get(name), Some(value), "{tag} v{version}.{name}");
                    }
                }
            }
            covered += 1;
        }
    }
    assert!(covered > 40, "only {covered} layouts were exercised");
    Ok(())
}
