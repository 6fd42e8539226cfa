use std::collections::HashMap;

use crate::diagnostic::Diagnostic;
use crate::rules::ValidationRule;
use pipeflow_model::{NodeKind, PipelineFlow};

/// Validation rule for supernode subflow references, including containment
/// cycles across pipelines
pub struct SupernodeRefsRule;

impl ValidationRule for SupernodeRefsRule {
    fn name(&self) -> &'static str {
        "supernode-refs"
    }

    fn description(&self) -> &'static str {
        "Supernode subflow references must resolve and must not form containment cycles"
    }

    fn check_flow(&self, flow: &PipelineFlow) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for pipeline in &flow.pipelines {
            for node in &pipeline.nodes {
                match &node.subflow_ref {
                    Some(subflow) => {
                        if node.kind != NodeKind::SuperNode {
                            diagnostics.push(
                                Diagnostic::error(
                                    self.name(),
                                    format!(
                                        "Node '{}' carries a subflow reference but is not a supernode",
                                        node.id
                                    ),
                                )
                                .in_pipeline(pipeline.id.clone())
                                .for_object(node.id.clone()),
                            );
                        } else if subflow.is_local()
                            && flow.pipeline(&subflow.pipeline_id).is_none()
                        {
                            diagnostics.push(
                                Diagnostic::error(
                                    self.name(),
                                    format!(
                                        "Supernode '{}' references missing pipeline '{}'",
                                        node.id, subflow.pipeline_id
                                    ),
                                )
                                .in_pipeline(pipeline.id.clone())
                                .for_object(node.id.clone()),
                            );
                        }
                    }
                    None => {
                        if node.kind == NodeKind::SuperNode {
                            diagnostics.push(
                                Diagnostic::error(
                                    self.name(),
                                    format!("Supernode '{}' has no subflow reference", node.id),
                                )
                                .in_pipeline(pipeline.id.clone())
                                .for_object(node.id.clone()),
                            );
                        }
                    }
                }
            }
        }

        if let Some(cycle) = find_cycle(flow) {
            diagnostics.push(
                Diagnostic::error(
                    self.name(),
                    format!("Supernode containment cycle: {}", cycle.join(" -> ")),
                )
                .in_pipeline(cycle[0].clone()),
            );
        }

        diagnostics
    }
}

#[derive(Clone, Copy, PartialEq)]
enum State {
    Unvisited,
    InProgress,
    Done,
}

enum Step<'a> {
    Descend(&'a str),
    Cycle(&'a str),
    Pop(&'a str),
    Skip,
}

/// First containment cycle over local subflow references, found with an
/// explicit-stack DFS. Returns the pipeline ids along the cycle, closed
/// (first id repeated at the end).
fn find_cycle(flow: &PipelineFlow) -> Option<Vec<String>> {
    let mut state: HashMap<&str, State> = flow
        .pipelines
        .iter()
        .map(|p| (p.id.as_str(), State::Unvisited))
        .collect();

    for start in flow.pipelines.iter().map(|p| p.id.as_str()) {
        if state.get(start) != Some(&State::Unvisited) {
            continue;
        }
        state.insert(start, State::InProgress);
        let mut stack: Vec<(&str, Vec<&str>, usize)> = vec![(start, children_of(flow, start), 0)];

        while !stack.is_empty() {
            let step = match stack.last_mut() {
                None => break,
                Some((id, children, index)) => {
                    if *index >= children.len() {
                        Step::Pop(*id)
                    } else {
                        let child = children[*index];
                        *index += 1;
                        match state.get(child).copied().unwrap_or(State::Done) {
                            State::Unvisited => Step::Descend(child),
                            State::InProgress => Step::Cycle(child),
                            State::Done => Step::Skip,
                        }
                    }
                }
            };
            match step {
                Step::Pop(id) => {
                    state.insert(id, State::Done);
                    stack.pop();
                }
                Step::Descend(child) => {
                    state.insert(child, State::InProgress);
                    let grandchildren = children_of(flow, child);
                    stack.push((child, grandchildren, 0));
                }
                Step::Cycle(child) => {
                    let from = stack
                        .iter()
                        .position(|(id, _, _)| *id == child)
                        .unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[from..].iter().map(|(id, _, _)| id.to_string()).collect();
                    cycle.push(child.to_string());
                    return Some(cycle);
                }
                Step::Skip => {}
            }
        }
    }
    None
}

fn children_of<'a>(flow: &'a PipelineFlow, pipeline_id: &str) -> Vec<&'a str> {
    match flow.pipeline(pipeline_id) {
        Some(pipeline) => pipeline
            .nodes
            .iter()
            .filter_map(|n| n.local_subflow())
            .filter(|sub| flow.pipeline(sub).is_some())
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeflow_model::{Node, Pipeline};

    #[test]
    fn test_nested_supernodes_are_clean() {
        let mut flow = PipelineFlow::new("flow", "p1");
        flow.pipelines.push(Pipeline::new("sub1"));
        flow.pipelines.push(Pipeline::new("sub2"));
        flow.pipeline_mut("p1")
            .unwrap()
            .nodes
            .push(Node::super_node("s1", "sub1"));
        flow.pipeline_mut("sub1")
            .unwrap()
            .nodes
            .push(Node::super_node("s2", "sub2"));

        assert!(SupernodeRefsRule.check_flow(&flow).is_empty());
    }

    #[test]
    fn test_missing_subflow_is_an_error() {
        let mut flow = PipelineFlow::new("flow", "p1");
        flow.pipeline_mut("p1")
            .unwrap()
            .nodes
            .push(Node::super_node("s1", "nowhere"));

        let diagnostics = SupernodeRefsRule.check_flow(&flow);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("nowhere"));
    }

    #[test]
    fn test_containment_cycle_reported_once() {
        let mut flow = PipelineFlow::new("flow", "p1");
        flow.pipelines.push(Pipeline::new("sub1"));
        flow.pipeline_mut("p1")
            .unwrap()
            .nodes
            .push(Node::super_node("down", "sub1"));
        flow.pipeline_mut("sub1")
            .unwrap()
            .nodes
            .push(Node::super_node("up", "p1"));

        let diagnostics = SupernodeRefsRule.check_flow(&flow);
        let cycles: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.message.contains("cycle"))
            .collect();
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].message.contains("p1"));
        assert!(cycles[0].message.contains("sub1"));
    }

    #[test]
    fn test_self_referential_supernode_is_a_cycle() {
        let mut flow = PipelineFlow::new("flow", "p1");
        flow.pipeline_mut("p1")
            .unwrap()
            .nodes
            .push(Node::super_node("weird", "p1"));

        let cycle = find_cycle(&flow).unwrap();
        assert_eq!(cycle, vec!["p1".to_string(), "p1".to_string()]);
    }
}
