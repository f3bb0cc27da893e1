use clap::Args;
use itertools::Itertools;
use m3_codec::{ExportOptions, ImportOptions};
use miette::{miette, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{is_container, read_file};

#[derive(Args)]
pub struct VerifyArgs {
    /// A directory to search, or a single M3 file
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Stop at the first failure
    #[arg(long, default_value_t = false)]
    fail_fast: bool,
}

impl VerifyArgs {
    /// Decodes, re-encodes and decodes again, expecting the same graph and the same bytes
    fn verify(path: &Path) -> Result<()> {
        let data = read_file(path)?;
        let import = ImportOptions::default();
        let export = ExportOptions::builder()
            .cull_unused_bones(false)
            .cull_material_layers(false)
            .build();

        let graph = m3_codec::decode(&data, &import)?;
        let first = m3_codec::encode(graph.clone(), &export)?;
        let decoded = m3_codec::decode(&first, &import)?;
        if decoded != graph {
            return Err(miette!("scene graph changed after re-encoding"));
        }
        let second = m3_codec::encode(decoded, &export)?;
        if first != second {
            return Err(miette!(
                "re-encoding is not stable ({} vs {} bytes)",
                first.len(),
                second.len()
            ));
        }
        debug!(size = data.len(), resaved = first.len(), "verified {}", path.display());
        Ok(())
    }

    pub fn handle(&self) -> Result<()> {
        let files = WalkDir::new(&self.directory)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_container(e.path()))
            .map(|e| e.into_path())
            .sorted()
            .collect::<Vec<_>>();

        info!("verifying {} containers", files.len());

        let mut failed = Vec::new();
        for path in &files {
            match Self::verify(path) {
                Ok(()) => println!("{} {}", "ok  ".green(), path.display()),
                Err(err) => {
                    println!("{} {}", "FAIL".red(), path.display());
                    warn!("{}: {:?}", path.display(), err);
                    failed.push(path);
                    if self.fail_fast {
                        break;
                    }
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(miette!(
                "{} of {} containers failed:\n{}",
                failed.len(),
                files.len(),
                failed.iter().map(|p| p.display()).join("\n")
            ))
        }
    }
}
