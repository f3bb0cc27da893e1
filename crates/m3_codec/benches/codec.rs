use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn unit(bone_count: u32) -> m3_codec::SceneGraph {
    use m3_codec::types::tags;
    use m3_codec::value::{Collection, Handle, Keyframe, Value};
    use m3_codec::{ContainerKind, Registry, SceneGraph};

    let registry = Registry::builtin();
    let record = |tag, version| registry.default_record(tag, version).unwrap();

    let bones = (0..bone_count)
        .map(|i| {
            let mut bone = record(tags::BONE, 1)
                .with("name", Value::Text(format!("bone_{i:03}")))
                .with(
                    "parent",
                    Value::Handle(i.checked_sub(1).map(|p| Handle::new(Collection::Bones, p))),
                );
            if let Some(track) = bone.get_mut("location").and_then(Value::as_anim_mut) {
                track.keys = (0..30)
                    .map(|frame| Keyframe {
                        time: frame * 33,
                        value: Value::Vec3([frame as f32, i as f32, 0.0]),
                    })
                    .collect();
            }
            bone
        })
        .collect();
    let materials = (0..8)
        .map(|i| record(tags::MAT, 20).with("name", Value::Text(format!("material_{i}"))))
        .collect();

    let mut root = record(tags::MODL, 29);
    root.set("name", Value::Text("bench".into()));
    SceneGraph {
        kind: ContainerKind::Model,
        root,
        collections: [
            (Collection::Bones, bones),
            (Collection::StandardMaterials, materials),
        ]
        .into_iter()
        .collect(),
    }
}

pub mod decode {
    use divan::Bencher;
    use m3_codec::{Container, ExportOptions, ImportOptions, Registry};

    fn get_input() -> Vec<u8> {
        m3_codec::encode(super::unit(64), &ExportOptions::default()).unwrap()
    }

    #[divan::bench]
    fn read_index(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(Container::read(data, Registry::builtin()).unwrap());
        });
    }

    #[divan::bench]
    fn decode_all(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(m3_codec::decode(data, &ImportOptions::default()).unwrap());
        });
    }

    #[divan::bench]
    fn decode_without_animations(bencher: Bencher) {
        let options = ImportOptions::builder().include_animations(false).build();
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(m3_codec::decode(data, &options).unwrap());
        });
    }
}

pub mod encode {
    use divan::Bencher;
    use m3_codec::config::SectionReuse;
    use m3_codec::ExportOptions;

    #[divan::bench(args = [16, 64, 256])]
    fn explicit(bencher: Bencher, bones: u32) {
        bencher
            .with_inputs(|| super::unit(bones))
            .bench_values(|graph| {
                divan::black_box(m3_codec::encode(graph, &ExportOptions::default()).unwrap());
            });
    }

    #[divan::bench(args = [16, 64, 256])]
    fn automatic(bencher: Bencher, bones: u32) {
        let options = ExportOptions::builder()
            .section_reuse(SectionReuse::Automatic)
            .build();
        bencher
            .with_inputs(|| super::unit(bones))
            .bench_values(|graph| {
                divan::black_box(m3_codec::encode(graph, &options).unwrap());
            });
    }
}
