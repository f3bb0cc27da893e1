use clap::{Args, ValueEnum};
use itertools::{EitherOrBoth, Itertools};
use m3_codec::{value::Record, SceneGraph};
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use super::{read_file, ImportArgs};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Mode {
    /// Name the records that differ
    #[default]
    Summary,
    /// Show every changed field
    Full,
}

#[derive(Debug, Eq, PartialEq)]
enum Change {
    Added(String),
    Removed(String),
    Comparison(String, String, String),
    Modified(String, Vec<String>),
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added(v) => writeln!(f, "✅ {}", v.green()),
            Change::Removed(v) => writeln!(f, "❌ {}", v.red()),
            Change::Comparison(key, old, new) => {
                writeln!(f, "* {}: {} vs {}", key, old.red(), new.green())
            }
            Change::Modified(v, context) => {
                writeln!(f, "🔃 {}", v.blue())?;
                if !context.is_empty() {
                    writeln!(f, "{}", context.iter().map(|l| format!("    {}", l)).join("\n"))?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Args)]
pub struct DiffArgs {
    /// An input M3 file
    #[arg(short, long, value_name = "FILE")]
    left: PathBuf,

    /// An input M3 file
    #[arg(short, long, value_name = "FILE")]
    right: PathBuf,

    /// Comparison mode
    #[arg(short, long, value_enum, default_value_t = Mode::Summary)]
    mode: Mode,

    #[command(flatten)]
    import: ImportArgs,
}

impl DiffArgs {
    fn load(&self, path: &Path) -> Result<SceneGraph> {
        let data = read_file(path)?;
        m3_codec::decode(&data, &self.import.options())
            .context(format!("decoding {}", path.display()))
    }

    /// Inline diff of the JSON form of two records
    fn context(&self, left: &Record, right: &Record) -> Result<Vec<String>> {
        if self.mode != Mode::Full {
            return Ok(Vec::new());
        }
        let old = serde_json::to_string_pretty(left).into_diagnostic()?;
        let new = serde_json::to_string_pretty(right).into_diagnostic()?;

        let diff = TextDiff::from_lines(&old, &new);
        let mut lines = Vec::new();
        for op in diff.ops() {
            for change in diff.iter_inline_changes(op) {
                if change.tag() == ChangeTag::Equal {
                    continue;
                }
                let mut line = String::new();
                for (emphasized, value) in change.iter_strings_lossy() {
                    let value = value.trim_end_matches('\n');
                    match (emphasized, change.tag()) {
                        (true, ChangeTag::Insert) => line.push_str(&format!("{}", value.green().underline())),
                        (true, _) => line.push_str(&format!("{}", value.red().underline())),
                        (false, _) => line.push_str(&format!("{}", value.dimmed())),
                    }
                }
                lines.push(line);
            }
        }
        Ok(lines)
    }

    fn compare_records(&self, label: &str, left: &Record, right: &Record) -> Result<Option<Change>> {
        if left == right {
            return Ok(None);
        }
        Ok(Some(Change::Modified(label.to_owned(), self.context(left, right)?)))
    }

    fn compare(&self, left: &SceneGraph, right: &SceneGraph) -> Result<Vec<Change>> {
        let mut changes = Vec::new();

        if left.kind != right.kind {
            changes.push(Change::Comparison(
                "kind".into(),
                left.kind.to_string(),
                right.kind.to_string(),
            ));
        }
        changes.extend(self.compare_records(&left.root.tag.to_string(), &left.root, &right.root)?);

        let collections = left
            .collections
            .keys()
            .chain(right.collections.keys())
            .unique()
            .sorted();
        for collection in collections {
            let lhs = left.collection(*collection).unwrap_or_default();
            let rhs = right.collection(*collection).unwrap_or_default();
            if lhs.len() != rhs.len() {
                changes.push(Change::Comparison(
                    format!("{collection} count"),
                    lhs.len().to_string(),
                    rhs.len().to_string(),
                ));
            }

            for (i, pair) in lhs.iter().zip_longest(rhs.iter()).enumerate() {
                let label = format!("{collection}[{i}]");
                match pair {
                    EitherOrBoth::Both(l, r) => changes.extend(self.compare_records(&label, l, r)?),
                    EitherOrBoth::Left(_) => changes.push(Change::Removed(label)),
                    EitherOrBoth::Right(_) => changes.push(Change::Added(label)),
                }
            }
        }
        Ok(changes)
    }

    pub fn handle(&self) -> Result<()> {
        let left = self.load(&self.left)?;
        let right = self.load(&self.right)?;

        let changes = self.compare(&left, &right)?;
        if changes.is_empty() {
            println!("{}", "scene graphs are identical".green());
            return Ok(());
        }
        for change in &changes {
            print!("{}", change);
        }
        Ok(())
    }
}
