use crate::diagnostic::Diagnostic;
use crate::rules::ValidationRule;
use pipeflow_model::{LinkKind, Pipeline, PipelineFlow};

/// Validation rule that reports ports carrying more links than their
/// declared maximum. A warning only: the store refuses to create such links,
/// but documents authored elsewhere are still loadable.
pub struct CardinalityRule;

impl ValidationRule for CardinalityRule {
    fn name(&self) -> &'static str {
        "cardinality"
    }

    fn description(&self) -> &'static str {
        "Port link counts should stay within the declared cardinality maximum"
    }

    fn check_pipeline(&self, _flow: &PipelineFlow, pipeline: &Pipeline) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for node in &pipeline.nodes {
            for port in &node.inputs {
                let count = pipeline
                    .links
                    .iter()
                    .filter(|l| {
                        l.kind == LinkKind::NodeLink
                            && l.trg_id == node.id
                            && l.trg_port.as_deref() == Some(port.id.as_str())
                    })
                    .count();
                diagnostics.extend(self.over_limit(pipeline, &node.id, port, count));
            }
            for port in &node.outputs {
                let count = pipeline
                    .links
                    .iter()
                    .filter(|l| {
                        l.kind == LinkKind::NodeLink
                            && l.src_id == node.id
                            && l.src_port.as_deref() == Some(port.id.as_str())
                    })
                    .count();
                diagnostics.extend(self.over_limit(pipeline, &node.id, port, count));
            }
        }
        diagnostics
    }
}

impl CardinalityRule {
    fn over_limit(
        &self,
        pipeline: &Pipeline,
        node_id: &str,
        port: &pipeflow_model::Port,
        count: usize,
    ) -> Option<Diagnostic> {
        if port.cardinality.is_unbounded() || (count as i64) <= port.cardinality.max {
            return None;
        }
        Some(
            Diagnostic::warning(
                self.name(),
                format!(
                    "Port '{}' on node '{node_id}' carries {count} links, max is {}",
                    port.id, port.cardinality.max
                ),
            )
            .in_pipeline(pipeline.id.clone())
            .for_object(node_id.to_string()),
        )
    }
}
