//! This library reads and writes **M3** model containers used by *StarCraft II* and *Heroes of the Storm*.
//!
//! # M3 Container Format
//!
//! An M3 container is a flat list of *sections*. Each section is an array of fixed-size records that
//! share one tag and one layout version. Records refer to each other through *references*, an
//! `(index, count, version)` triple naming an entry of the section index. The graph formed this
//! way is rooted at a single `MODL` record (a model) or `ANIM` record (a standalone animation).
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "43DM", the tag `MD34` stored reversed            |
//! | 0x0004         | Index Offset           | 4 bytes: Offset of the section index from the file start   |
//! | 0x0008         | Index Count            | 4 bytes: Number of entries in the section index            |
//! | 0x000C         | Root Reference         | 12 bytes: index, count and version of the root section     |
//!
//! The header occupies 24 bytes, is padded to 32 and is itself entry 0 of the index.
//!
//! ### Sections
//!
//! Section data follows the header back to back. Every section starts on a 16 byte boundary; the gap
//! after a section is filled with `0xAA`.
//!
//! ### Section Index
//!
//! The index sits after the last section and holds one 16 byte entry per section:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Tag                    | 4 bytes: Record tag, stored reversed                    |
//! | 0x0004         | Offset                 | 4 bytes: Offset of the section from the file start      |
//! | 0x0008         | Count                  | 4 bytes: Number of records (bytes, for `CHAR` and `U8__`) |
//! | 0x000C         | Version                | 4 bytes: Layout version of every record in the section  |
//!
//! ## Additional Information
//!
//! - **File Extensions**: `.m3` (model), `.m3a` (animation)
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Record layouts**: described per tag and version by a [`Registry`]
//!

use tracing::instrument;

pub mod anim;
pub mod assemble;
pub(crate) mod codec;
pub mod config;
pub mod error;
pub mod prune;
pub mod read;
pub mod registry;
pub mod resolve;
pub mod scene;
pub mod session;
pub mod types;
pub mod value;
pub mod write;

pub use assemble::Assembler;
pub use config::{ExportOptions, ImportOptions};
pub use read::{Container, ContainerKind};
pub use registry::Registry;
pub use resolve::{ResolvedModel, Resolver};
pub use scene::SceneGraph;
pub use session::{Session, Stage};
pub use write::ContainerWriter;

/// Decodes a container into a [`SceneGraph`] using the builtin registry
#[instrument(skip_all, err)]
pub fn decode(bytes: &[u8], options: &ImportOptions) -> error::Result<SceneGraph> {
    let registry = Registry::builtin();
    let container = Container::read(bytes, registry)?;
    let model = Resolver::new(&container, registry, options).resolve_model()?;
    Assembler::new(registry).assemble(model)
}

/// Encodes a [`SceneGraph`] using the builtin registry
#[instrument(skip_all, err)]
pub fn encode(graph: SceneGraph, options: &ExportOptions) -> error::Result<Vec<u8>> {
    ContainerWriter::new(Registry::builtin(), options.clone()).encode(graph)
}
