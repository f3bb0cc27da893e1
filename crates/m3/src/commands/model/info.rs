use clap::Args;
use m3_codec::{Container, Registry};
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use super::{read_file, ImportArgs};

#[derive(Args)]
pub struct InfoArgs {
    /// An input M3 file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    #[command(flatten)]
    import: ImportArgs,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_file(&self.file)?;
        let container = Container::read(&data, Registry::builtin())?;
        let graph = m3_codec::decode(&data, &self.import.options())
            .context(format!("decoding {}", self.file.display()))?;

        println!("{}", self.file.display().bold());
        println!("  kind:     {}", graph.kind);
        println!("  root:     {} v{}", graph.root.tag, graph.root.version);
        if let Some(name) = graph.root.text("name").filter(|name| !name.is_empty()) {
            println!("  name:     {}", name);
        }
        println!("  size:     {} bytes", data.len());
        println!("  sections: {}", container.entries().len());

        let animated = graph.bones().iter().filter(|bone| bone.is_animated()).count();
        for (collection, records) in &graph.collections {
            if records.is_empty() {
                continue;
            }
            println!("  {:<22} {}", format!("{collection}:"), records.len());
        }
        if animated > 0 {
            println!("  {:<22} {}", "animated bones:", animated.cyan());
        }
        Ok(())
    }
}
