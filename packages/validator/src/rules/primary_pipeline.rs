use crate::diagnostic::Diagnostic;
use crate::rules::ValidationRule;
use pipeflow_model::PipelineFlow;

/// Validation rule that requires the primary pipeline id to resolve
pub struct PrimaryPipelineRule;

impl ValidationRule for PrimaryPipelineRule {
    fn name(&self) -> &'static str {
        "primary-pipeline"
    }

    fn description(&self) -> &'static str {
        "The flow's primary_pipeline must name a pipeline in the document"
    }

    fn check_flow(&self, flow: &PipelineFlow) -> Vec<Diagnostic> {
        if flow.pipeline(&flow.primary_pipeline).is_some() {
            return Vec::new();
        }
        vec![Diagnostic::error(
            self.name(),
            format!(
                "Primary pipeline '{}' does not exist in the document",
                flow.primary_pipeline
            ),
        )
        .for_object(flow.primary_pipeline.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolving_primary_is_clean() {
        let flow = PipelineFlow::new("flow", "p1");
        let diagnostics = PrimaryPipelineRule.check_flow(&flow);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_dangling_primary_is_an_error() {
        let mut flow = PipelineFlow::new("flow", "p1");
        flow.primary_pipeline = "missing".to_string();
        let diagnostics = PrimaryPipelineRule.check_flow(&flow);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, "primary-pipeline");
        assert!(diagnostics[0].is_error());
    }
}
