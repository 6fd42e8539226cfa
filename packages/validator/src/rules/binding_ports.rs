use crate::diagnostic::Diagnostic;
use crate::rules::ValidationRule;
use pipeflow_model::{NodeKind, Pipeline, PipelineFlow};

/// Validation rule for the port shape of binding nodes
pub struct BindingPortsRule;

impl ValidationRule for BindingPortsRule {
    fn name(&self) -> &'static str {
        "binding-ports"
    }

    fn description(&self) -> &'static str {
        "Entry bindings carry no input ports; exit bindings carry no output ports"
    }

    fn check_pipeline(&self, _flow: &PipelineFlow, pipeline: &Pipeline) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for node in &pipeline.nodes {
            let offending = match node.kind {
                NodeKind::BindingEntry if !node.inputs.is_empty() => Some("input"),
                NodeKind::BindingExit if !node.outputs.is_empty() => Some("output"),
                _ => None,
            };
            if let Some(side) = offending {
                diagnostics.push(
                    Diagnostic::error(
                        self.name(),
                        format!("Binding node '{}' must not declare {side} ports", node.id),
                    )
                    .in_pipeline(pipeline.id.clone())
                    .for_object(node.id.clone()),
                );
            }
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeflow_model::{Node, Port};

    #[test]
    fn test_correct_binding_shapes_are_clean() {
        let mut flow = PipelineFlow::new("flow", "p1");
        let pipeline = flow.pipeline_mut("p1").unwrap();
        pipeline.nodes.push(Node::binding_entry("entry"));
        pipeline.nodes.push(Node::binding_exit("exit"));

        let pipeline = flow.pipeline("p1").unwrap();
        assert!(BindingPortsRule.check_pipeline(&flow, pipeline).is_empty());
    }

    #[test]
    fn test_entry_with_inputs_is_an_error() {
        let mut flow = PipelineFlow::new("flow", "p1");
        let mut entry = Node::binding_entry("entry");
        entry.inputs.push(Port::input("bad"));
        flow.pipeline_mut("p1").unwrap().nodes.push(entry);

        let pipeline = flow.pipeline("p1").unwrap();
        let diagnostics = BindingPortsRule.check_pipeline(&flow, pipeline);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].object_id.as_deref(), Some("entry"));
    }
}
