use clap::{Args, ValueEnum};
use m3_codec::{
    config::{DedupPolicy, SectionReuse},
    types::Tag,
    ContainerWriter, ExportOptions, Registry,
};
use miette::{miette, Context, Result};
use std::{collections::BTreeMap, path::PathBuf};
use tracing::info;

use super::{read_file, ImportArgs};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Reuse {
    /// Every reference gets its own section
    #[default]
    Explicit,
    /// Sections with equal bytes are written once
    Automatic,
    /// Sections equal outside their reserved fields are written once
    IgnoreReserved,
}

/// Parses `TAG=VERSION`, for example `PAR_=14`
fn parse_target(text: &str) -> Result<(Tag, u32), String> {
    let (tag, version) = text
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=VERSION, found {text}"))?;
    let tag = Tag::parse(tag).ok_or_else(|| format!("{tag} is not a four character tag"))?;
    let version = version
        .parse()
        .map_err(|_| format!("{version} is not a version number"))?;
    Ok((tag, version))
}

#[derive(Args)]
pub struct ResaveArgs {
    /// An input M3 file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The target file, replaced only once it is complete
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// How equal sections are shared
    #[arg(short, long, value_enum, default_value_t = Reuse::Explicit)]
    reuse: Reuse,

    /// Drop sequences and keyframes
    #[arg(long, default_value_t = false)]
    strip_animations: bool,

    /// Keep bones nothing refers to
    #[arg(long, default_value_t = false)]
    keep_unused_bones: bool,

    /// Give every blank material layer slot its own section
    #[arg(long, default_value_t = false)]
    keep_blank_layers: bool,

    /// Collapse animated bounds to one key spanning all of them
    #[arg(long, default_value_t = false)]
    max_bounds: bool,

    /// Write a tag at a specific layout version
    #[arg(short, long, value_name = "TAG=VERSION", value_parser = parse_target)]
    target: Vec<(Tag, u32)>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    #[command(flatten)]
    import: ImportArgs,
}

impl ResaveArgs {
    fn export_options(&self) -> ExportOptions {
        let (section_reuse, dedup_policy) = match self.reuse {
            Reuse::Explicit => (SectionReuse::Explicit, DedupPolicy::EncodedBytes),
            Reuse::Automatic => (SectionReuse::Automatic, DedupPolicy::EncodedBytes),
            Reuse::IgnoreReserved => (SectionReuse::Automatic, DedupPolicy::IgnoreReserved),
        };
        ExportOptions::builder()
            .output_anims(!self.strip_animations)
            .section_reuse(section_reuse)
            .dedup_policy(dedup_policy)
            .cull_unused_bones(!self.keep_unused_bones)
            .cull_material_layers(!self.keep_blank_layers)
            .use_only_max_bounds(self.max_bounds)
            .target_versions(self.target.iter().copied().collect::<BTreeMap<_, _>>())
            .build()
    }

    pub fn handle(&self) -> Result<()> {
        if !self.overwrite && self.output.exists() {
            return Err(miette!(
                "{} already exists, pass --overwrite to replace it",
                self.output.display()
            ));
        }

        let data = read_file(&self.file)?;
        let graph = m3_codec::decode(&data, &self.import.options())
            .context(format!("decoding {}", self.file.display()))?;

        ContainerWriter::new(Registry::builtin(), self.export_options())
            .write_to_path(graph, &self.output)
            .context(format!("writing {}", self.output.display()))?;

        info!("wrote {}", self.output.display());
        Ok(())
    }
}
