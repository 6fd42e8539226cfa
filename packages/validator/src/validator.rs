use crate::diagnostic::Diagnostic;
use crate::error::ValidationError;
use crate::rules::RuleRegistry;
use pipeflow_model::PipelineFlow;

/// Options for configuring a validation pass
#[derive(Debug, Default)]
pub struct ValidateOptions {
    /// Custom rule registry (uses default if None)
    pub registry: Option<RuleRegistry>,
}

/// Validate a pipeline flow and return every finding, not just the first.
/// Error-level findings are structural violations; warnings are conditions
/// the store would refuse to create but loads tolerate.
pub fn validate_flow(flow: &PipelineFlow, options: ValidateOptions) -> Vec<Diagnostic> {
    let registry = options.registry.unwrap_or_default();
    let mut diagnostics = Vec::new();

    for rule in registry.rules() {
        diagnostics.extend(rule.check_flow(flow));
    }
    for pipeline in &flow.pipelines {
        for rule in registry.rules() {
            diagnostics.extend(rule.check_pipeline(flow, pipeline));
        }
    }
    diagnostics
}

/// Ok, or every error-level diagnostic bundled into one error
pub fn ensure_valid(flow: &PipelineFlow) -> Result<(), ValidationError> {
    let diagnostics: Vec<Diagnostic> = validate_flow(flow, ValidateOptions::default())
        .into_iter()
        .filter(Diagnostic::is_error)
        .collect();
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { diagnostics })
    }
}
