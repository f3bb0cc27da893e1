mod common;

use common::{attachment, bone, count_sections, layer, model, record, track};
use m3_codec::config::SectionReuse;
use m3_codec::error::{ErrorKind, Result};
use m3_codec::types::tags;
use m3_codec::value::{Bounds, Collection, Handle, Keyframe, Value};
use m3_codec::{decode, encode, ContainerWriter, ExportOptions, ImportOptions, Registry};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use tracing_test::traced_test;

fn materials(count: usize) -> Vec<m3_codec::value::Record> {
    (0..count)
        .map(|i| record(tags::MAT, 20).with("name", Value::Text(format!("material_{i}"))))
        .collect()
}

#[traced_test]
#[test]
fn blank_layers_share_one_section() -> Result<()> {
    let graph = || model([(Collection::StandardMaterials, materials(2))]);

    let culled = encode(graph(), &ExportOptions::default())?;
    assert_eq!(count_sections(&culled, tags::LAYR), 1);

    let kept = ExportOptions::builder().cull_material_layers(false).build();
    let unculled = encode(graph(), &kept)?;
    assert_eq!(count_sections(&unculled, tags::LAYR), 2 * 18);

    let decoded = decode(&unculled, &ImportOptions::default())?;
    let material = &decoded.collection(Collection::StandardMaterials).expect("imported")[1];
    let normal = material.records("layer_normal").expect("layer slot");
    assert_eq!(normal.len(), 1);
    assert_eq!(normal[0].get("rtt_channel"), Some(&Value::I32(-1)));
    Ok(())
}

#[traced_test]
#[test]
fn automatic_reuse_shares_identical_layers() -> Result<()> {
    let graph = || {
        let textured: Vec<_> = materials(2)
            .into_iter()
            .map(|material| material.with("layer_diffuse", layer("shared.dds")))
            .collect();
        model([(Collection::StandardMaterials, textured)])
    };

    let explicit = encode(graph(), &ExportOptions::default())?;
    assert_eq!(count_sections(&explicit, tags::LAYR), 3);

    let automatic = ExportOptions::builder()
        .section_reuse(SectionReuse::Automatic)
        .build();
    let shared = encode(graph(), &automatic)?;
    assert_eq!(count_sections(&shared, tags::LAYR), 2);
    assert!(shared.len() < explicit.len());

    let decoded = decode(&shared, &ImportOptions::default())?;
    for material in decoded.collection(Collection::StandardMaterials).expect("imported") {
        let diffuse = material.records("layer_diffuse").expect("layer slot");
        assert_eq!(diffuse[0].text("image_path"), Some("shared.dds"));
    }
    Ok(())
}

#[traced_test]
#[test]
fn unused_bones_are_culled_on_export() -> Result<()> {
    let matrices = (0..3)
        .map(|i| {
            let mut matrix = [0.0; 16];
            matrix[12] = i as f32;
            record(tags::IREF, 0).with("matrix", Value::Matrix(matrix))
        })
        .collect();
    let graph = model([
        (
            Collection::Bones,
            vec![bone("root", None), bone("stray", Some(0)), bone("arm", Some(0))],
        ),
        (Collection::RestMatrices, matrices),
        (Collection::AttachmentPoints, vec![attachment("ref_weapon", 2)]),
    ]);

    let decoded = decode(&encode(graph.clone(), &ExportOptions::default())?, &ImportOptions::default())?;
    let names: Vec<_> = decoded.bones().iter().filter_map(|b| b.text("name")).collect();
    assert_eq!(names, vec!["root", "arm"]);

    let offsets: Vec<_> = decoded
        .collection(Collection::RestMatrices)
        .expect("imported")
        .iter()
        .filter_map(|r| match r.get("matrix") {
            Some(Value::Matrix(matrix)) => Some(matrix[12]),
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![0.0, 2.0]);

    let point = &decoded.collection(Collection::AttachmentPoints).expect("imported")[0];
    assert_eq!(point.handle("bone"), Some(Handle::new(Collection::Bones, 1)));

    let keep = ExportOptions::builder().cull_unused_bones(false).build();
    let decoded = decode(&encode(graph, &keep)?, &ImportOptions::default())?;
    assert_eq!(decoded.bones().len(), 3);
    Ok(())
}

#[traced_test]
#[test]
fn animated_bounds_collapse_to_one_key() -> Result<()> {
    let bounds = |min: f32, max: f32, radius: f32| {
        Value::Bounds(Bounds {
            min: [min; 3],
            max: [max; 3],
            radius,
        })
    };
    let mut graph = model([(Collection::Bones, Vec::new())]);
    graph.root.set(
        "bounds_anim",
        track(&[
            (0, bounds(-1.0, 1.0, 1.5)),
            (250, bounds(-2.0, 0.5, 3.0)),
            (500, bounds(0.0, 4.0, 2.0)),
        ]),
    );

    let options = ExportOptions::builder().use_only_max_bounds(true).build();
    let decoded = decode(&encode(graph.clone(), &options)?, &ImportOptions::default())?;
    let collapsed = decoded.root.anim("bounds_anim").expect("track is decoded");
    assert_eq!(
        collapsed.keys,
        vec![Keyframe {
            time: 0,
            value: bounds(-2.0, 4.0, 3.0),
        }]
    );

    let decoded = decode(&encode(graph, &ExportOptions::default())?, &ImportOptions::default())?;
    assert_eq!(decoded.root.anim("bounds_anim").map(|t| t.keys.len()), Some(3));
    Ok(())
}

#[traced_test]
#[test]
fn hold_time_follows_the_target_version() -> Result<()> {
    let graph = || {
        let mut emitter = record(tags::PAR, 24);
        if let Some(track) = emitter.get_mut("color_init").and_then(Value::as_anim_mut) {
            track.hold = Some(0.25);
        }
        model([(Collection::ParticleSystems, vec![emitter])])
    };

    let current = decode(&encode(graph(), &ExportOptions::default())?, &ImportOptions::default())?;
    let color = current.particle_systems()[0].anim("color_init").expect("track is decoded");
    assert_eq!(color.hold, Some(0.25));

    let older = ExportOptions::builder()
        .target_versions(BTreeMap::from([(tags::PAR, 14)]))
        .build();
    let old = decode(&encode(graph(), &older)?, &ImportOptions::default())?;
    let emitter = &old.particle_systems()[0];
    assert_eq!(emitter.version, 14);
    assert_eq!(emitter.anim("color_init").expect("track is decoded").hold, None);
    assert!(logs_contain("hold time not stored by this version"));
    Ok(())
}

#[traced_test]
#[test]
fn stripping_animations_keeps_resting_values() -> Result<()> {
    let animated = bone("root", None).with(
        "location",
        track(&[(0, Value::Vec3([1.0, 2.0, 3.0])), (100, Value::Vec3([0.0; 3]))]),
    );
    let graph = model([
        (Collection::Sequences, vec![record(tags::SEQS, 2)]),
        (Collection::Bones, vec![animated]),
        (Collection::AttachmentPoints, vec![attachment("ref_origin", 0)]),
    ]);

    let options = ExportOptions::builder().output_anims(false).build();
    let bytes = encode(graph, &options)?;
    assert_eq!(count_sections(&bytes, tags::SD3V), 0);
    assert_eq!(count_sections(&bytes, tags::SEQS), 0);

    let decoded = decode(&bytes, &ImportOptions::default())?;
    assert_eq!(decoded.collection(Collection::Sequences), Some(&[][..]));
    let location = decoded.bones()[0].anim("location").expect("track is decoded");
    assert!(location.keys.is_empty());
    assert_eq!(location.value, Value::Vec3([1.0, 2.0, 3.0]));
    Ok(())
}

#[traced_test]
#[test]
fn misordered_keys_leave_the_destination_untouched() -> Result<()> {
    let graph = |times: [i32; 3]| {
        let keys: Vec<_> = times.iter().map(|t| (*t, Value::Vec3([*t as f32; 3]))).collect();
        model([(Collection::Bones, vec![bone("root", None).with("location", track(&keys))])])
    };
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("unit.m3");
    std::fs::write(&path, b"previous export")?;

    let writer = ContainerWriter::new(Registry::builtin(), ExportOptions::default());
    let err = writer.write_to_path(graph([0, 50, 50]), &path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidKeyOrder);
    assert_eq!(
        err.to_string(),
        "BONE.location: keyframe 2 at time 50 does not follow time 50"
    );
    assert_eq!(std::fs::read(&path)?, b"previous export");
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);

    writer.write_to_path(graph([0, 50, 100]), &path)?;
    let bytes = std::fs::read(&path)?;
    assert_eq!(&bytes[..4], b"43DM");
    let decoded = decode(&bytes, &ImportOptions::default())?;
    assert_eq!(decoded.bones()[0].anim("location").map(|t| t.keys.len()), Some(3));
    Ok(())
}

#[test]
fn collections_the_target_root_cannot_hold_are_rejected() -> Result<()> {
    let older_root = |warps: Vec<m3_codec::value::Record>| {
        let options = ExportOptions::builder()
            .target_versions(BTreeMap::from([(tags::MODL, 26)]))
            .build();
        encode(model([(Collection::Warps, warps)]), &options)
    };

    let err = older_root(vec![record(tags::WRP, 1)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidField);
    assert_eq!(
        err.to_string(),
        "MODL.warps holds 1 Warps records at version 26 where no records before version 28 was expected"
    );

    let bytes = older_root(Vec::new())?;
    assert_eq!(count_sections(&bytes, tags::WRP), 0);
    Ok(())
}
