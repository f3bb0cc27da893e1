use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::{fs::File, io::BufWriter, path::PathBuf};
use tracing::info;

use super::{read_file, ImportArgs};

#[derive(Args)]
pub struct DumpArgs {
    /// An input M3 file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Write the JSON here instead of standard output
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Indent the JSON
    #[arg(long, default_value_t = false)]
    pretty: bool,

    #[command(flatten)]
    import: ImportArgs,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_file(&self.file)?;
        let graph = m3_codec::decode(&data, &self.import.options())
            .context(format!("decoding {}", self.file.display()))?;

        match &self.output {
            Some(path) => {
                let out = File::create(path)
                    .into_diagnostic()
                    .context(format!("creating {}", path.display()))?;
                let out = BufWriter::new(out);
                if self.pretty {
                    serde_json::to_writer_pretty(out, &graph).into_diagnostic()?;
                } else {
                    serde_json::to_writer(out, &graph).into_diagnostic()?;
                }
                info!("wrote {}", path.display());
            }
            None => {
                let text = if self.pretty {
                    serde_json::to_string_pretty(&graph)
                } else {
                    serde_json::to_string(&graph)
                }
                .into_diagnostic()?;
                println!("{}", text);
            }
        }
        Ok(())
    }
}
