use std::collections::HashMap;

use crate::diagnostic::Diagnostic;
use crate::rules::ValidationRule;
use pipeflow_model::{Pipeline, PipelineFlow, Port};

/// Validation rule that enforces id uniqueness inside each pipeline
pub struct DuplicateIdsRule;

impl ValidationRule for DuplicateIdsRule {
    fn name(&self) -> &'static str {
        "duplicate-ids"
    }

    fn description(&self) -> &'static str {
        "Node, link and comment ids must be unique per pipeline; port ids unique per node"
    }

    fn check_pipeline(&self, _flow: &PipelineFlow, pipeline: &Pipeline) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for id in pipeline
            .nodes
            .iter()
            .map(|n| n.id.as_str())
            .chain(pipeline.comments.iter().map(|c| c.id.as_str()))
            .chain(pipeline.links.iter().map(|l| l.id.as_str()))
        {
            *seen.entry(id).or_insert(0) += 1;
        }
        for (id, count) in seen {
            if count > 1 {
                diagnostics.push(
                    Diagnostic::error(
                        self.name(),
                        format!("Id '{id}' is used by {count} objects in the same pipeline"),
                    )
                    .in_pipeline(pipeline.id.clone())
                    .for_object(id.to_string()),
                );
            }
        }

        for node in &pipeline.nodes {
            for (ports, side) in [(&node.inputs, "input"), (&node.outputs, "output")] {
                diagnostics.extend(duplicate_ports(ports).into_iter().map(|port_id| {
                    Diagnostic::error(
                        self.name(),
                        format!("Node '{}' declares {side} port '{port_id}' twice", node.id),
                    )
                    .in_pipeline(pipeline.id.clone())
                    .for_object(node.id.clone())
                }));
            }
        }

        diagnostics
    }
}

fn duplicate_ports(ports: &[Port]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for port in ports {
        *seen.entry(port.id.as_str()).or_insert(0) += 1;
    }
    let mut duplicated: Vec<String> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    duplicated.sort();
    duplicated
}
