use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use pipeflow_migrate::upgrade;
use pipeflow_model::PipelineFlow;
use pipeflow_validator::{validate_flow, Diagnostic, DiagnosticLevel, ValidateOptions};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Input document or directory to validate
    pub input: PathBuf,

    /// Also list files that pass
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn validate(args: ValidateArgs) -> Result<()> {
    println!("🔍 {} Pipeline validation", "Starting".green().bold());
    println!("   Input: {}", args.input.display());
    println!();

    let mut total_findings = 0;
    let mut total_errors = 0;
    let mut total_warnings = 0;
    let mut files_checked = 0;

    if args.input.is_file() {
        let (findings, errors, warnings) = validate_file(&args.input, args.verbose, &args.format)?;
        total_findings += findings;
        total_errors += errors;
        total_warnings += warnings;
        files_checked += 1;
    } else if args.input.is_dir() {
        let documents = find_documents(&args.input);
        println!("   Found {} documents", documents.len());
        println!();

        for file in documents {
            let (findings, errors, warnings) = validate_file(&file, args.verbose, &args.format)?;
            total_findings += findings;
            total_errors += errors;
            total_warnings += warnings;
            files_checked += 1;
        }
    } else {
        return Err(anyhow!(
            "Input path does not exist: {}",
            args.input.display()
        ));
    }

    println!();
    println!(
        "✨ {} Validation complete!",
        if total_errors > 0 {
            "Done".red().bold()
        } else {
            "Done".green().bold()
        }
    );
    println!("   Files checked: {}", files_checked);
    println!("   Total findings: {}", total_findings);

    if total_errors > 0 {
        println!("   {} {}", "Errors:".red(), total_errors);
    }
    if total_warnings > 0 {
        println!("   {} {}", "Warnings:".yellow(), total_warnings);
    }
    if total_errors == 0 && total_warnings == 0 {
        println!("   {} No issues found!", "✓".green());
    }

    // Exit code tells CI whether the documents are loadable
    if total_errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Returns (findings, errors, warnings) for one document.
fn validate_file(path: &Path, verbose: bool, format: &str) -> Result<(usize, usize, usize)> {
    let flow = match load_flow(path) {
        Ok(flow) => flow,
        Err(err) => {
            eprintln!("{} Failed to load {}: {:#}", "✗".red(), path.display(), err);
            return Ok((0, 1, 0));
        }
    };

    let diagnostics = validate_flow(&flow, ValidateOptions::default());

    if diagnostics.is_empty() {
        if verbose {
            println!("{} {}", "✓".green(), path.display());
        }
        return Ok((0, 0, 0));
    }

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else {
        println!("{}", path.display());
        for diagnostic in &diagnostics {
            print_diagnostic(diagnostic);
        }
        println!();
    }

    Ok((diagnostics.len(), errors, warnings))
}

/// Brings the document to the current schema version, then parses it.
/// Validation findings are reported separately; this only fails on files
/// the model cannot represent at all.
fn load_flow(path: &Path) -> Result<PipelineFlow> {
    let source =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&source)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let doc = upgrade(doc).context("schema upgrade failed")?;
    Ok(PipelineFlow::from_value(doc)?)
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let level = match diagnostic.level {
        DiagnosticLevel::Error => "error".red().bold(),
        DiagnosticLevel::Warning => "warning".yellow().bold(),
    };
    let location = match (&diagnostic.pipeline_id, &diagnostic.object_id) {
        (Some(pipeline), Some(object)) => format!(" ({pipeline}/{object})"),
        (Some(pipeline), None) => format!(" ({pipeline})"),
        _ => String::new(),
    };
    println!(
        "  {} [{}] {}{}",
        level,
        diagnostic.rule,
        diagnostic.message,
        location.dimmed()
    );
}

fn find_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let is_document = path
            .extension()
            .map(|e| e == "pipeline" || e == "json")
            .unwrap_or(false);
        if path.is_file() && is_document {
            files.push(path.to_path_buf());
        }
    }

    files
}
