use crate::diagnostic::Diagnostic;
use crate::rules::ValidationRule;
use pipeflow_model::{Link, LinkKind, Node, Pipeline, PipelineFlow};

/// Validation rule that checks link endpoints, ports and direction
pub struct LinkIntegrityRule;

impl ValidationRule for LinkIntegrityRule {
    fn name(&self) -> &'static str {
        "link-integrity"
    }

    fn description(&self) -> &'static str {
        "Link endpoints must resolve in their pipeline and node-links must run output to input"
    }

    fn check_pipeline(&self, _flow: &PipelineFlow, pipeline: &Pipeline) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for link in &pipeline.links {
            match link.kind {
                LinkKind::NodeLink => self.check_node_link(pipeline, link, &mut diagnostics),
                LinkKind::CommentLink => {
                    if pipeline.comment(&link.src_id).is_none() {
                        diagnostics.push(self.dangling(pipeline, link, "comment", &link.src_id));
                    }
                    if pipeline.node(&link.trg_id).is_none() {
                        diagnostics.push(self.dangling(pipeline, link, "node", &link.trg_id));
                    }
                }
                LinkKind::AssociationLink => {
                    for end in [&link.src_id, &link.trg_id] {
                        if pipeline.node(end).is_none() {
                            diagnostics.push(self.dangling(pipeline, link, "node", end));
                        }
                    }
                }
            }
        }
        diagnostics
    }
}

impl LinkIntegrityRule {
    fn dangling(&self, pipeline: &Pipeline, link: &Link, what: &str, id: &str) -> Diagnostic {
        Diagnostic::error(
            self.name(),
            format!("Link '{}' references missing {what} '{id}'", link.id),
        )
        .in_pipeline(pipeline.id.clone())
        .for_object(link.id.clone())
    }

    fn check_node_link(&self, pipeline: &Pipeline, link: &Link, diagnostics: &mut Vec<Diagnostic>) {
        let src = pipeline.node(&link.src_id);
        let trg = pipeline.node(&link.trg_id);
        if src.is_none() {
            diagnostics.push(self.dangling(pipeline, link, "node", &link.src_id));
        }
        if trg.is_none() {
            diagnostics.push(self.dangling(pipeline, link, "node", &link.trg_id));
        }

        if let Some(src) = src {
            self.check_endpoint(pipeline, link, src, &link.src_port, Direction::Source, diagnostics);
        }
        if let Some(trg) = trg {
            self.check_endpoint(pipeline, link, trg, &link.trg_port, Direction::Target, diagnostics);
        }
    }

    fn check_endpoint(
        &self,
        pipeline: &Pipeline,
        link: &Link,
        node: &Node,
        port: &Option<String>,
        direction: Direction,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let (expected, opposite, side) = match direction {
            Direction::Source => (&node.outputs, &node.inputs, "output"),
            Direction::Target => (&node.inputs, &node.outputs, "input"),
        };
        match port {
            Some(port_id) => {
                if expected.iter().any(|p| p.id == *port_id) {
                    return;
                }
                let message = if opposite.iter().any(|p| p.id == *port_id) {
                    format!(
                        "Link '{}' runs through '{port_id}' on node '{}', which is not an {side} port",
                        link.id, node.id
                    )
                } else {
                    format!(
                        "Link '{}' references missing port '{port_id}' on node '{}'",
                        link.id, node.id
                    )
                };
                diagnostics.push(
                    Diagnostic::error(self.name(), message)
                        .in_pipeline(pipeline.id.clone())
                        .for_object(link.id.clone()),
                );
            }
            None => {
                // port-less binding endpoints are the one legal omission
                if expected.is_empty() && !node.kind.is_binding() {
                    diagnostics.push(
                        Diagnostic::error(
                            self.name(),
                            format!(
                                "Link '{}' attaches to node '{}', which has no {side} ports",
                                link.id, node.id
                            ),
                        )
                        .in_pipeline(pipeline.id.clone())
                        .for_object(link.id.clone()),
                    );
                }
            }
        }
    }
}

enum Direction {
    Source,
    Target,
}
