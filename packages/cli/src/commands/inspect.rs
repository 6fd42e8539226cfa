use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pipeflow_editor::{FlowEditor, ValidationMode};
use pipeflow_migrate::{base_version, LATEST_VERSION};
use pipeflow_validator::DiagnosticLevel;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input document to summarize
    pub input: PathBuf,

    /// List every validation finding instead of the counts
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&source)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;
    let from = base_version(&doc).context("document has no usable version field")?;

    // Advisory mode: summarize broken documents too instead of refusing
    let editor = FlowEditor::open(doc, ValidationMode::Advisory)
        .with_context(|| format!("cannot load {}", args.input.display()))?;
    let flow = editor.flow();

    println!("📋 {} {}", "Document".green().bold(), flow.id.bold());
    if from < LATEST_VERSION {
        println!("   Schema: v{} (upgraded from v{})", LATEST_VERSION, from);
    } else {
        println!("   Schema: v{}", from);
    }
    if !flow.runtimes.is_empty() {
        let names: Vec<&str> = flow.runtimes.iter().map(|r| r.name.as_str()).collect();
        println!("   Runtimes: {}", names.join(", "));
    }
    println!();

    for pipeline in &flow.pipelines {
        let marker = if pipeline.id == flow.primary_pipeline {
            " (primary)"
        } else {
            ""
        };
        let name = pipeline.name.as_deref().unwrap_or(&pipeline.id);
        println!("   {}{}", name.bold(), marker.dimmed());

        let supernodes = pipeline.nodes.iter().filter(|n| n.is_super_node()).count();
        let bindings = pipeline
            .nodes
            .iter()
            .filter(|n| n.kind.is_binding())
            .count();
        println!(
            "     {} nodes ({} supernodes, {} bindings), {} links, {} comments",
            pipeline.nodes.len(),
            supernodes,
            bindings,
            pipeline.links.len(),
            pipeline.comments.len()
        );
    }

    let diagnostics = editor.validate();
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;

    println!();
    if diagnostics.is_empty() {
        println!("   {} No validation findings", "✓".green());
    } else if args.verbose {
        for diagnostic in &diagnostics {
            let level = match diagnostic.level {
                DiagnosticLevel::Error => "error".red().bold(),
                DiagnosticLevel::Warning => "warning".yellow().bold(),
            };
            println!("   {} [{}] {}", level, diagnostic.rule, diagnostic.message);
        }
    } else {
        let errors_part = if errors > 0 {
            format!("{errors} errors").red().to_string()
        } else {
            "0 errors".to_string()
        };
        let warnings_part = if warnings > 0 {
            format!("{warnings} warnings").yellow().to_string()
        } else {
            "0 warnings".to_string()
        };
        println!(
            "   {} findings ({}, {})",
            diagnostics.len(),
            errors_part,
            warnings_part
        );
    }

    Ok(())
}
