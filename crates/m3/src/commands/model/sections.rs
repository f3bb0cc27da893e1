use clap::Args;
use m3_codec::{types::Tag, Container, Registry};
use miette::{miette, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use super::read_file;

#[derive(Args)]
pub struct SectionsArgs {
    /// An input M3 file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Only list sections with this tag
    #[arg(short, long, value_name = "TAG")]
    tag: Option<String>,
}

impl SectionsArgs {
    pub fn handle(&self) -> Result<()> {
        let filter = self
            .tag
            .as_deref()
            .map(|tag| Tag::parse(tag).ok_or_else(|| miette!("{tag} is not a four character tag")))
            .transpose()?;

        let data = read_file(&self.file)?;
        let registry = Registry::builtin();
        let container = Container::read(&data, registry)?;

        println!("{:>5}  {:<4}  {:>10}  {:>8}  {:>7}  {:>8}", "index", "tag", "offset", "count", "version", "extent");
        for (i, entry) in container.entries().iter().enumerate() {
            if filter.is_some_and(|tag| tag != entry.tag) {
                continue;
            }
            let extent = container.extent(i as u32).unwrap_or_default();
            let line = format!(
                "{:>5}  {:<4}  {:>#10x}  {:>8}  {:>7}  {:>8}",
                i,
                entry.tag.to_string(),
                entry.offset,
                entry.count,
                entry.version,
                extent
            );
            match registry.lookup(entry.tag, entry.version) {
                Ok(schema) if schema.documented => println!("{}", line),
                Ok(_) => println!("{}", line.yellow()),
                Err(_) => println!("{}", line.red()),
            }
        }
        Ok(())
    }
}
