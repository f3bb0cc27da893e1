use super::{AnimKind as A, FieldDef, FieldKind as K, IndexWidth as W, Literal as L, TagDef};
use crate::config::Category;
use crate::types::tags::*;
use crate::value::Collection as C;

const fn f(name: &'static str, kind: K) -> FieldDef {
    FieldDef::new(name, kind)
}

const fn anim(name: &'static str, kind: A) -> FieldDef {
    FieldDef::new(name, K::Anim(kind, None))
}

const fn held(name: &'static str, kind: A, since: u32) -> FieldDef {
    FieldDef::new(name, K::Anim(kind, Some(since)))
}

const fn bone(name: &'static str, width: W) -> FieldDef {
    FieldDef::new(name, K::Index(C::Bones, width))
}

const fn text(name: &'static str) -> FieldDef {
    FieldDef::new(name, K::Ref(CHAR))
}

const fn layer(name: &'static str) -> FieldDef {
    FieldDef::new(name, K::Layer)
}

const WHITE: L = L::Color([255, 255, 255, 255]);
const CLEAR: L = L::Color([255, 255, 255, 0]);

static MATERIAL_TARGETS: &[(u32, C)] = &[
    (1, C::StandardMaterials),
    (2, C::DisplacementMaterials),
    (3, C::CompositeMaterials),
    (4, C::TerrainMaterials),
];

static MODL_FIELDS: &[FieldDef] = &[
    text("name"),
    f("flags", K::U32),
    f("sequences", K::Collection(SEQS, C::Sequences)).category(Category::Animations),
    f("bones", K::Collection(BONE, C::Bones)).category(Category::Rig),
    f("skin_bone_count", K::U32),
    f("vertex_flags", K::U32),
    f("vertices", K::Ref(U8)).category(Category::Mesh),
    f("regions", K::Collection(REGN, C::Regions)).category(Category::Mesh),
    f("batches", K::Collection(BAT, C::Batches)).category(Category::Mesh),
    f("faces", K::Ref(U16)).category(Category::Mesh),
    f("bone_lookup", K::IndexList(U16, C::Bones)).category(Category::Mesh),
    f("bounds", K::Bounds),
    anim("bounds_anim", A::Bounds),
    f("attachments", K::Collection(ATT, C::AttachmentPoints)).category(Category::Rig),
    f("lights", K::Collection(LITE, C::Lights)).category(Category::Effects),
    f("shadow_boxes", K::Collection(SHBX, C::ShadowBoxes))
        .since(21)
        .category(Category::Rig),
    f("cameras", K::Collection(CAM, C::Cameras)).category(Category::Rig),
    f("material_refs", K::Collection(MATM, C::MaterialRefs)).category(Category::Materials),
    f("materials_standard", K::Collection(MAT, C::StandardMaterials))
        .category(Category::Materials),
    f("materials_displacement", K::Collection(DIS, C::DisplacementMaterials))
        .category(Category::Materials),
    f("materials_composite", K::Collection(CMP, C::CompositeMaterials))
        .category(Category::Materials),
    f("materials_terrain", K::Collection(TER, C::TerrainMaterials))
        .category(Category::Materials),
    f("particle_systems", K::Collection(PAR, C::ParticleSystems)).category(Category::Effects),
    f("particle_copies", K::Collection(PARC, C::ParticleCopies)).category(Category::Effects),
    f("ribbons", K::Collection(RIB, C::Ribbons)).category(Category::Effects),
    f("projections", K::Collection(PROJ, C::Projections)).category(Category::Effects),
    f("forces", K::Collection(FOR, C::Forces)).category(Category::Effects),
    f("warps", K::Collection(WRP, C::Warps))
        .since(28)
        .category(Category::Effects),
    f("rigid_bodies", K::Collection(PHRB, C::RigidBodies)).category(Category::Rig),
    f("ik_joints", K::Collection(IKJT, C::IkJoints)).category(Category::Rig),
    f("rest_matrices", K::Collection(IREF, C::RestMatrices)).category(Category::Rig),
    f("hit_tests", K::Collection(SSGS, C::HitTests)).category(Category::Rig),
    f("lod_flags", K::U32).since(25),
    f("reserved", K::Reserved(8)).since(30),
];

static ANIM_FIELDS: &[FieldDef] = &[
    text("name"),
    f("sequences", K::Collection(SEQS, C::Sequences)),
    f("bones", K::Collection(BONE, C::Bones)),
];

static SEQS_FIELDS: &[FieldDef] = &[
    text("name"),
    f("start", K::U32),
    f("end", K::U32),
    f("movement_speed", K::F32),
    f("flags", K::U32),
    f("frequency", K::U32).default(L::Int(100)),
    f("replay_min", K::U32),
    f("replay_max", K::U32),
    f("bounds", K::Bounds),
    f("priority", K::U32).since(2),
];

static BONE_FIELDS: &[FieldDef] = &[
    f("id", K::I32).default(L::Int(-1)),
    text("name"),
    f("flags", K::U32),
    bone("parent", W::I16),
    f("reserved", K::Reserved(2)),
    anim("location", A::Vec3),
    anim("rotation", A::Quat),
    anim("scale", A::Vec3).default(L::Float(1.0)),
    anim("visibility", A::Flag).default(L::Int(1)),
];

static IREF_FIELDS: &[FieldDef] = &[f("matrix", K::Matrix)];

static REGN_FIELDS: &[FieldDef] = &[
    f("flags", K::U32),
    f("first_vertex", K::U32),
    f("vertex_count", K::U32),
    f("first_face", K::U32),
    f("face_count", K::U32),
    f("bone_count", K::U16),
    f("first_bone_lookup", K::U16),
    f("bone_lookup_count", K::U16),
    f("reserved", K::Reserved(2)),
    f("vertex_weights_max", K::U8),
    f("root_bone_lookup", K::U8),
    f("reserved2", K::Reserved(2)),
    f("uv_multiplier", K::F32).since(3).default(L::Float(16.0)),
    f("uv_offset", K::Vec2).since(4),
    f("tangent_flags", K::U32).since(5),
];

static BAT_FIELDS: &[FieldDef] = &[
    f("flags", K::U32),
    f("region", K::Index(C::Regions, W::U16)),
    f("reserved", K::Reserved(2)),
    f("material_ref", K::Index(C::MaterialRefs, W::U16)),
    bone("bone", W::I16),
];

static MATM_FIELDS: &[FieldDef] = &[
    f("material_type", K::U32).default(L::Int(1)),
    f(
        "material_index",
        K::TypedIndex {
            selector: "material_type",
            targets: MATERIAL_TARGETS,
            width: W::U32,
        },
    ),
];

static MAT_FIELDS: &[FieldDef] = &[
    text("name"),
    f("flags", K::U32),
    f("blend_mode", K::U32),
    f("priority", K::I32),
    f("used_rtt_channels", K::U32),
    f("specularity", K::F32),
    f("depth_blend_falloff", K::F32),
    f("cutout_threshold", K::U32),
    f("specular_multiplier", K::F32).default(L::Float(1.0)),
    f("emissive_multiplier", K::F32).default(L::Float(1.0)),
    layer("layer_diffuse"),
    layer("layer_decal"),
    layer("layer_specular"),
    layer("layer_gloss").since(16),
    layer("layer_emissive"),
    layer("layer_emissive2"),
    layer("layer_evio"),
    layer("layer_evio_mask"),
    layer("layer_alpha"),
    layer("layer_alpha2"),
    layer("layer_normal"),
    layer("layer_height"),
    layer("layer_lightmap"),
    layer("layer_ao"),
    layer("layer_normal_blend1_mask").since(19),
    layer("layer_normal_blend2_mask").since(19),
    layer("layer_normal_blend1").since(19),
    layer("layer_normal_blend2").since(19),
    f("layer_blend_type", K::U32),
    f("emissive_blend_type", K::U32),
    f("emissive_mode", K::U32),
    f("specular_type", K::U32),
    anim("parallax_height", A::Real).since(17),
    f("reserved", K::Reserved(8)),
    f("unknown_v20", K::U32).since(20),
];

static LAYR_FIELDS: &[FieldDef] = &[
    f("id", K::U32),
    text("image_path"),
    anim("color", A::Color).default(WHITE),
    f("flags", K::U32),
    f("uv_source", K::U32),
    f("color_channels", K::U32),
    anim("brightness_multiplier", A::Real).default(L::Float(1.0)),
    anim("midtone_offset", A::Real),
    f("reserved", K::Reserved(4)),
    f("noise_amplitude", K::F32).since(23),
    f("noise_frequency", K::F32).since(23),
    f("rtt_channel", K::I32).default(L::Int(-1)),
    f("video_frame_rate", K::U32),
    f("video_start_frame", K::U32),
    f("video_end_frame", K::I32).default(L::Int(-1)),
    f("video_mode", K::U32),
    f("video_sync_timing", K::U32),
    anim("video_play", A::Flag),
    anim("video_restart", A::Flag),
    f("flipbook_rows", K::U32),
    f("flipbook_cols", K::U32),
    anim("flipbook_frame", A::I16),
    anim("uv_offset", A::Vec2),
    anim("uv_angle", A::Vec3),
    anim("uv_tiling", A::Vec2).default(L::Float(1.0)),
    anim("uv_w_translation", A::Real).since(24),
    anim("uv_w_scale", A::Real).since(24).default(L::Float(1.0)),
    anim("brightness", A::Real).default(L::Float(1.0)),
    f("triplanar_offset", K::Vec3).since(25),
    f("fresnel_type", K::U32).since(25),
    f("fresnel_exponent", K::F32).since(25).default(L::Float(4.0)),
    f("fresnel_min", K::F32).since(25),
    f("fresnel_max_offset", K::F32).since(25).default(L::Float(1.0)),
    f("fresnel_mask", K::Vec3).since(26),
    f("fresnel_rotation_yaw", K::F32).since(26),
    f("fresnel_rotation_pitch", K::F32).since(26),
];

static DIS_FIELDS: &[FieldDef] = &[
    text("name"),
    f("reserved", K::Reserved(4)),
    anim("strength_factor", A::Real).default(L::Float(1.0)),
    layer("layer_normal"),
    layer("layer_strength"),
    f("flags", K::U32),
    f("priority", K::I32),
];

static CMP_FIELDS: &[FieldDef] = &[
    text("name"),
    f("reserved", K::Reserved(4)),
    f("sections", K::Ref(CMS)),
];

static CMS_FIELDS: &[FieldDef] = &[
    f("material_ref", K::Index(C::MaterialRefs, W::U32)),
    anim("alpha_factor", A::Real).default(L::Float(1.0)),
];

static TER_FIELDS: &[FieldDef] = &[text("name"), layer("layer_terrain")];

static PAR_FIELDS: &[FieldDef] = &[
    bone("bone", W::U32),
    f("flags", K::U32),
    f("particle_type", K::U32),
    f("emit_type", K::U32),
    f("emit_shape", K::U32),
    anim("emit_shape_size", A::Vec3).default(L::Float(1.0)),
    anim("emit_shape_size_cutout", A::Vec3),
    anim("emit_shape_radius", A::Real).default(L::Float(1.0)),
    anim("emit_shape_radius_cutout", A::Real),
    anim("emit_speed", A::Real),
    anim("emit_speed_random", A::Real).default(L::Float(1.0)),
    anim("emit_angle_x", A::Real),
    anim("emit_angle_y", A::Real),
    anim("emit_spread_x", A::Real),
    anim("emit_spread_y", A::Real),
    anim("lifespan", A::Real).default(L::Float(0.5)),
    anim("lifespan_random", A::Real).default(L::Float(1.0)),
    f("distance_limit", K::F32),
    f("gravity", K::F32),
    f("mass", K::F32).default(L::Float(1.0)),
    f("mass2", K::F32).default(L::Float(1.0)),
    f("friction", K::F32),
    f("bounce", K::F32),
    f("drag", K::F32),
    f("wind_multiplier", K::F32).since(10),
    held("color_init", A::Color, 17).default(WHITE),
    held("color_mid", A::Color, 17).default(WHITE),
    held("color_end", A::Color, 17).default(CLEAR),
    anim("color2_init", A::Color).since(17).default(WHITE),
    anim("color2_mid", A::Color).since(17).default(WHITE),
    anim("color2_end", A::Color).since(17).default(CLEAR),
    f("color_anim_mid", K::F32).since(17).default(L::Float(0.5)),
    f("alpha_anim_mid", K::F32).since(17).default(L::Float(0.5)),
    f("rotation_anim_mid", K::F32).since(17).default(L::Float(0.5)),
    f("size_anim_mid", K::F32).since(17).default(L::Float(0.5)),
    f("color_smoothing", K::U32),
    f("rotation_smoothing", K::U32),
    f("size_smoothing", K::U32),
    held("rotation", A::Vec3, 17),
    anim("rotation2", A::Vec3).since(17),
    held("size", A::Vec3, 17).default(L::Float(1.0)),
    anim("size2", A::Vec3).since(17).default(L::Float(1.0)),
    f("emit_max", K::U32).default(L::Int(60)),
    anim("emit_rate", A::Real),
    anim("emit_count", A::I16),
    f("noise_amplitude", K::F32).since(10),
    f("noise_frequency", K::F32).since(10),
    f("noise_cohesion", K::F32).since(10),
    f("noise_edge", K::F32).since(10).default(L::Float(0.1)),
    f("material_ref", K::Index(C::MaterialRefs, W::U32)),
    text("model_path").since(19),
    f("instance_tail", K::F32).since(24).default(L::Float(1.0)),
    f("instance_yaw", K::F32).since(24),
    f("instance_pitch", K::F32).since(24),
    f("uv_flipbook_cols", K::U16),
    f("uv_flipbook_rows", K::U16),
    f("uv_flipbook_start_init_index", K::U8),
    f("uv_flipbook_start_stop_index", K::U8),
    f("uv_flipbook_end_init_index", K::U8),
    f("uv_flipbook_end_stop_index", K::U8),
    f("uv_flipbook_start_lifespan_factor", K::Fixed8).default(L::Float(1.0)),
    f("reserved", K::Reserved(3)),
    f("local_forces", K::U16),
    f("world_forces", K::U16),
    f("trail_system", K::Index(C::ParticleSystems, W::I32)),
    f("trail_chance", K::F32).default(L::Float(1.0)),
    anim("trail_rate", A::Real),
    f("collide_system", K::Index(C::ParticleSystems, W::I32)).since(12),
    f("collide_emit_min", K::U32).since(12),
    f("collide_emit_max", K::U32).since(12),
    f("collide_emit_chance", K::F32).since(12).default(L::Float(1.0)),
    f("collide_emit_energy", K::F32).since(12),
    f("collide_events_cull", K::U32).since(14),
    anim("parent_velocity", A::Real).since(11),
    f("pitch_var_shape", K::U32).since(18),
    anim("pitch_var_amplitude", A::Real).since(18),
    anim("pitch_var_frequency", A::Real).since(18),
    f("yaw_var_shape", K::U32).since(18),
    anim("yaw_var_amplitude", A::Real).since(18),
    anim("yaw_var_frequency", A::Real).since(18),
    f("speed_var_shape", K::U32).since(18),
    anim("speed_var_amplitude", A::Real).since(18),
    anim("speed_var_frequency", A::Real).since(18),
    f("sort_method", K::U32).since(21),
    f("tail_type", K::U32).since(22),
    f("emit_shape_spline", K::Ref(VEC3)).since(23),
    f("reserved_v23", K::Reserved(4)).since(23),
];

static PARC_FIELDS: &[FieldDef] = &[
    anim("emit_rate", A::Real),
    anim("emit_count", A::I16),
    bone("bone", W::U32),
    f("systems", K::IndexList(U32, C::ParticleSystems)),
];

static RIB_FIELDS: &[FieldDef] = &[
    bone("bone", W::U32),
    f("material_ref", K::Index(C::MaterialRefs, W::U32)),
    f("ribbon_type", K::U32),
    anim("speed", A::Real),
    anim("size", A::Real).default(L::Float(1.0)),
    anim("length", A::Real).default(L::Float(1.0)),
    anim("color", A::Color).default(WHITE),
    anim("lifespan", A::Real).default(L::Float(0.5)),
    f("drag", K::F32),
    f("gravity", K::F32),
    f("flags", K::U32),
    f("divisions", K::F32).since(8).default(L::Float(20.0)),
    f("sides", K::U32).since(9).default(L::Int(5)),
];

static PROJ_FIELDS: &[FieldDef] = &[
    f("projection_type", K::U32),
    bone("bone", W::U32),
    f("material_ref", K::Index(C::MaterialRefs, W::U16)),
    f("reserved", K::Reserved(2)),
    anim("field_of_view", A::Real).default(L::Float(45.0)),
    anim("aspect_ratio", A::Real).default(L::Float(1.0)),
    anim("near", A::Real).default(L::Float(0.5)),
    anim("far", A::Real).default(L::Float(10.0)),
    f("alpha_init", K::F32),
    f("alpha_mid", K::F32).default(L::Float(1.0)),
    f("alpha_end", K::F32),
    f("lifetime", K::F32).default(L::Float(1.0)),
    f("flags", K::U32),
    anim("active", A::Flag).default(L::Int(1)),
    f("layer_priority", K::U32).since(5),
];

static FOR_FIELDS: &[FieldDef] = &[
    f("force_type", K::U32),
    f("shape", K::U32).since(2),
    f("reserved", K::Reserved(4)),
    bone("bone", W::U32),
    f("flags", K::U32),
    f("channels", K::U32),
    anim("strength", A::Real).default(L::Float(1.0)),
    anim("width", A::Real).default(L::Float(1.0)),
    anim("height", A::Real).since(2).default(L::Float(1.0)),
    anim("length", A::Real).since(2).default(L::Float(1.0)),
];

static LITE_FIELDS: &[FieldDef] = &[
    f("light_type", K::U16),
    f("reserved", K::Reserved(2)),
    bone("bone", W::I16),
    f("flags", K::U16),
    anim("color", A::Vec3).default(L::Float(1.0)),
    anim("intensity", A::Real).default(L::Float(1.0)),
    anim("specular_color", A::Vec3),
    anim("specular_intensity", A::Real),
    anim("attenuation_far", A::Real).default(L::Float(3.0)),
    f("unknown", K::F32),
    anim("attenuation_near", A::Real).default(L::Float(2.0)),
    anim("hotspot", A::Real).default(L::Float(1.0)),
    anim("falloff", A::Real).default(L::Float(1.0)),
    f("lod_cut", K::U16),
    f("shadow_lod_cut", K::U16),
];

static WRP_FIELDS: &[FieldDef] = &[
    f("reserved", K::Reserved(4)),
    bone("bone", W::U32),
    f("unknown", K::U32),
    anim("radius", A::Real).default(L::Float(1.0)),
    anim("unknown_anim", A::Real),
    anim("strength", A::Real).default(L::Float(1.0)),
    f("reserved2", K::Reserved(16)),
];

static ATT_FIELDS: &[FieldDef] = &[
    f("id", K::I32).default(L::Int(-1)),
    text("name"),
    bone("bone", W::U32),
];

static SSGS_FIELDS: &[FieldDef] = &[
    f("shape", K::U32),
    bone("bone", W::I16),
    f("reserved", K::Reserved(2)),
    f("matrix", K::Matrix),
    f("size0", K::F32),
    f("size1", K::F32),
    f("size2", K::F32),
];

static PHRB_FIELDS: &[FieldDef] = &[
    f("reserved_v2", K::Reserved(8)).until(3),
    bone("bone", W::U16),
    f("reserved", K::Reserved(2)),
    f("physical_material", K::U32).since(3),
    f("density", K::F32).since(3).default(L::Float(1.0)),
    f("friction", K::F32).since(3).default(L::Float(0.7)),
    f("restitution", K::F32).since(3).default(L::Float(0.1)),
    f("linear_damp", K::F32).since(3).default(L::Float(0.001)),
    f("angular_damp", K::F32).since(3).default(L::Float(0.001)),
    f("gravity_scale", K::F32).since(3).default(L::Float(1.0)),
    f("shapes", K::Ref(PHSH)),
    f("flags", K::U32),
    f("priority", K::U16).since(4),
    f("reserved_v4", K::Reserved(2)).since(4),
];

static PHSH_FIELDS: &[FieldDef] = &[
    f("matrix", K::Matrix),
    f("shape", K::U8),
    f("reserved", K::Reserved(3)),
    f("size0", K::F32),
    f("size1", K::F32),
    f("size2", K::F32),
    f("vertices", K::Ref(VEC3)).since(3),
    f("faces", K::Ref(U16)).since(3),
];

static IKJT_FIELDS: &[FieldDef] = &[
    f("joint_type", K::U32),
    bone("bone_target", W::U32),
    bone("bone_base", W::U32),
    f("reserved", K::Reserved(4)),
    f("max_search_up", K::F32),
    f("max_search_down", K::F32),
    f("max_speed", K::F32),
    f("goal_threshold", K::F32),
];

static CAM_FIELDS: &[FieldDef] = &[
    bone("bone", W::U32),
    text("name"),
    anim("field_of_view", A::Real).default(L::Float(0.7)),
    f("flags", K::U32),
    anim("far_clip", A::Real).default(L::Float(100.0)),
    anim("near_clip", A::Real).default(L::Float(0.1)),
    anim("clip2", A::Real).default(L::Float(100.0)),
    anim("focal_depth", A::Real).default(L::Float(2.0)),
    anim("falloff_start", A::Real).default(L::Float(1.0)),
    anim("falloff_end", A::Real).default(L::Float(2.0)),
    anim("depth_of_field", A::Real).default(L::Float(0.5)),
    f("depth_of_field_type", K::U32).since(5),
    anim("unknown_v5", A::Real).since(5),
];

static SHBX_FIELDS: &[FieldDef] = &[
    bone("bone", W::U32),
    anim("length", A::Real).default(L::Float(1.0)),
    anim("width", A::Real).default(L::Float(1.0)),
    anim("height", A::Real).default(L::Float(1.0)),
];

static VALUE_U8: &[FieldDef] = &[f("value", K::U8)];
static VALUE_U16: &[FieldDef] = &[f("value", K::U16)];
static VALUE_U32: &[FieldDef] = &[f("value", K::U32)];
static VALUE_I32: &[FieldDef] = &[f("value", K::I32)];
static VALUE_F32: &[FieldDef] = &[f("value", K::F32)];
static VALUE_VEC2: &[FieldDef] = &[f("value", K::Vec2)];
static VALUE_VEC3: &[FieldDef] = &[f("value", K::Vec3)];
static VALUE_VEC4: &[FieldDef] = &[f("value", K::Vec4)];
static VALUE_QUAT: &[FieldDef] = &[f("value", K::Quat)];

static KEY_REAL: &[FieldDef] = &[f("time", K::I32), f("value", K::F32)];
static KEY_VEC2: &[FieldDef] = &[f("time", K::I32), f("value", K::Vec2)];
static KEY_VEC3: &[FieldDef] = &[f("time", K::I32), f("value", K::Vec3)];
static KEY_QUAT: &[FieldDef] = &[f("time", K::I32), f("value", K::Quat)];
static KEY_COLOR: &[FieldDef] = &[f("time", K::I32), f("value", K::Color)];
static KEY_I16: &[FieldDef] = &[f("time", K::I32), f("value", K::I16)];
static KEY_U32: &[FieldDef] = &[f("time", K::I32), f("value", K::U32)];
static KEY_BOUNDS: &[FieldDef] = &[f("time", K::I32), f("value", K::Bounds)];

pub(super) static BUILTIN: &[TagDef] = &[
    TagDef::new(MODL, &[20, 21, 23, 24, 25, 26, 28, 29, 30], MODL_FIELDS),
    TagDef::new(ANIM, &[1], ANIM_FIELDS),
    TagDef::new(SEQS, &[1, 2], SEQS_FIELDS),
    TagDef::new(BONE, &[1], BONE_FIELDS),
    TagDef::new(IREF, &[0], IREF_FIELDS),
    TagDef::new(REGN, &[2, 3, 4, 5], REGN_FIELDS),
    TagDef::new(BAT, &[1], BAT_FIELDS),
    TagDef::new(MATM, &[0], MATM_FIELDS),
    TagDef::new(MAT, &[15, 16, 17, 18, 19, 20], MAT_FIELDS),
    TagDef::new(LAYR, &[22, 23, 24, 25, 26], LAYR_FIELDS),
    TagDef::new(DIS, &[4], DIS_FIELDS),
    TagDef::new(CMP, &[2], CMP_FIELDS),
    TagDef::new(CMS, &[0], CMS_FIELDS),
    TagDef::new(TER, &[0], TER_FIELDS),
    TagDef::new(PAR, &[10, 11, 12, 14, 17, 18, 19, 21, 22, 23, 24], PAR_FIELDS).legacy_floor(9),
    TagDef::new(PARC, &[0], PARC_FIELDS),
    TagDef::new(RIB, &[6, 8, 9], RIB_FIELDS),
    TagDef::new(PROJ, &[4, 5], PROJ_FIELDS),
    TagDef::new(FOR, &[1, 2], FOR_FIELDS),
    TagDef::new(LITE, &[7], LITE_FIELDS),
    TagDef::new(WRP, &[1], WRP_FIELDS),
    TagDef::new(ATT, &[1], ATT_FIELDS),
    TagDef::new(SSGS, &[1], SSGS_FIELDS),
    TagDef::new(PHRB, &[2, 3, 4], PHRB_FIELDS),
    TagDef::new(PHSH, &[1, 3], PHSH_FIELDS),
    TagDef::new(IKJT, &[0], IKJT_FIELDS),
    TagDef::new(CAM, &[3, 5], CAM_FIELDS),
    TagDef::new(SHBX, &[3], SHBX_FIELDS),
    TagDef::new(CHAR, &[0], VALUE_U8),
    TagDef::new(U8, &[0], VALUE_U8),
    TagDef::new(U16, &[0], VALUE_U16),
    TagDef::new(U32, &[0], VALUE_U32),
    TagDef::new(I32, &[0], VALUE_I32),
    TagDef::new(REAL, &[0], VALUE_F32),
    TagDef::new(VEC2, &[0], VALUE_VEC2),
    TagDef::new(VEC3, &[0], VALUE_VEC3),
    TagDef::new(VEC4, &[0], VALUE_VEC4),
    TagDef::new(QUAT, &[0], VALUE_QUAT),
    TagDef::new(SDR3, &[0], KEY_REAL),
    TagDef::new(SD2V, &[0], KEY_VEC2),
    TagDef::new(SD3V, &[0], KEY_VEC3),
    TagDef::new(SD4Q, &[0], KEY_QUAT),
    TagDef::new(SDCC, &[0], KEY_COLOR),
    TagDef::new(SDS6, &[0], KEY_I16),
    TagDef::new(SDU3, &[0], KEY_U32),
    TagDef::new(SDFG, &[0], KEY_U32),
    TagDef::new(SDMB, &[0], KEY_BOUNDS),
];
