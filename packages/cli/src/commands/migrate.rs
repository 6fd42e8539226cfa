use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use pipeflow_migrate::{base_version, upgrade, LATEST_VERSION};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Input document to upgrade
    pub input: PathBuf,

    /// Write the upgraded document here (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(long)]
    pub in_place: bool,
}

pub fn migrate(args: MigrateArgs) -> Result<()> {
    if args.in_place && args.output.is_some() {
        return Err(anyhow!("--in-place and --output are mutually exclusive"));
    }

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&source)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;

    let from = base_version(&doc).context("document has no usable version field")?;
    let upgraded = upgrade(doc).context("schema upgrade failed")?;
    let rendered = serde_json::to_string_pretty(&upgraded)?;

    let destination = if args.in_place {
        Some(args.input.clone())
    } else {
        args.output
    };

    match destination {
        Some(path) => {
            fs::write(&path, rendered + "\n")
                .with_context(|| format!("cannot write {}", path.display()))?;
            if from >= LATEST_VERSION {
                println!(
                    "{} {} is already at version {}",
                    "✓".green(),
                    args.input.display(),
                    from
                );
            } else {
                println!(
                    "{} {} v{} → v{} written to {}",
                    "✓".green(),
                    args.input.display(),
                    from,
                    LATEST_VERSION,
                    path.display()
                );
            }
        }
        // Bare document on stdout so the output can be piped
        None => println!("{rendered}"),
    }

    Ok(())
}
