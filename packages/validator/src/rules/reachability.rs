use std::collections::HashSet;

use crate::diagnostic::Diagnostic;
use crate::rules::ValidationRule;
use pipeflow_model::PipelineFlow;

/// Validation rule that flags pipelines no supernode chain leads to
pub struct ReachabilityRule;

impl ValidationRule for ReachabilityRule {
    fn name(&self) -> &'static str {
        "pipeline-reachability"
    }

    fn description(&self) -> &'static str {
        "Every non-primary pipeline must be reachable from the primary through supernode references"
    }

    fn check_flow(&self, flow: &PipelineFlow) -> Vec<Diagnostic> {
        // a dangling primary is the primary-pipeline rule's finding
        if flow.pipeline(&flow.primary_pipeline).is_none() {
            return Vec::new();
        }

        let reachable = reachable_pipelines(flow);
        flow.pipelines
            .iter()
            .filter(|p| !reachable.contains(p.id.as_str()))
            .map(|p| {
                Diagnostic::error(
                    self.name(),
                    format!("Pipeline '{}' is not referenced by any supernode", p.id),
                )
                .in_pipeline(p.id.clone())
            })
            .collect()
    }
}

fn reachable_pipelines(flow: &PipelineFlow) -> HashSet<&str> {
    let mut reachable = HashSet::new();
    let mut stack = vec![flow.primary_pipeline.as_str()];
    while let Some(id) = stack.pop() {
        if !reachable.insert(id) {
            continue;
        }
        if let Some(pipeline) = flow.pipeline(id) {
            for node in &pipeline.nodes {
                if let Some(sub) = node.local_subflow() {
                    stack.push(sub);
                }
            }
        }
    }
    reachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeflow_model::{Node, Pipeline};

    #[test]
    fn test_supernode_subtree_is_reachable() {
        let mut flow = PipelineFlow::new("flow", "p1");
        flow.pipelines.push(Pipeline::new("sub"));
        flow.pipeline_mut("p1")
            .unwrap()
            .nodes
            .push(Node::super_node("s1", "sub"));

        assert!(ReachabilityRule.check_flow(&flow).is_empty());
    }

    #[test]
    fn test_orphan_pipeline_is_an_error() {
        let mut flow = PipelineFlow::new("flow", "p1");
        flow.pipelines.push(Pipeline::new("orphan"));

        let diagnostics = ReachabilityRule.check_flow(&flow);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].pipeline_id.as_deref(), Some("orphan"));
    }
}
