pub mod diff;
pub mod dump;
pub mod info;
pub mod resave;
pub mod sections;
pub mod verify;

use clap::Args;
use m3_codec::ImportOptions;
use miette::{Context, IntoDiagnostic, Result};
use std::path::Path;

#[derive(clap::Subcommand)]
pub enum ModelCommands {
    /// Summarize a container
    Info(info::InfoArgs),
    /// List the section index of a container
    Sections(sections::SectionsArgs),
    /// Print the decoded scene graph as JSON
    Dump(dump::DumpArgs),
    /// Decode a container and write it back out
    Resave(resave::ResaveArgs),
    /// Compare the scene graphs of two containers
    Diff(diff::DiffArgs),
    /// Round trip every container below a directory
    Verify(verify::VerifyArgs),
}

impl ModelCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            ModelCommands::Info(info) => info.handle(),
            ModelCommands::Sections(sections) => sections.handle(),
            ModelCommands::Dump(dump) => dump.handle(),
            ModelCommands::Resave(resave) => resave.handle(),
            ModelCommands::Diff(diff) => diff.handle(),
            ModelCommands::Verify(verify) => verify.handle(),
        }
    }
}

/// Categories to leave undecoded
#[derive(Args, Debug, Clone, Copy)]
pub struct ImportArgs {
    /// Skip vertices, faces, regions and batches
    #[arg(long, default_value_t = false)]
    no_mesh: bool,

    /// Skip particles, ribbons, projections, forces, lights and warps
    #[arg(long, default_value_t = false)]
    no_effects: bool,

    /// Skip bones and everything attached to them, along with sequences and keyframes
    #[arg(long, default_value_t = false)]
    no_rig: bool,

    /// Skip sequences and keyframes
    #[arg(long, default_value_t = false)]
    no_animations: bool,
}

impl ImportArgs {
    pub fn options(&self) -> ImportOptions {
        ImportOptions::builder()
            .include_mesh(!self.no_mesh)
            .include_effects(!self.no_effects)
            .include_rig(!self.no_rig)
            .include_animations(!self.no_animations)
            .build()
    }
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))
}

pub fn is_container(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("m3") || ext.eq_ignore_ascii_case("m3a"))
}
