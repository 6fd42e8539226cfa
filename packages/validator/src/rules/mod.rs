mod binding_ports;
mod cardinality;
mod duplicate_ids;
mod link_integrity;
mod primary_pipeline;
mod reachability;
mod supernode_refs;

pub use binding_ports::BindingPortsRule;
pub use cardinality::CardinalityRule;
pub use duplicate_ids::DuplicateIdsRule;
pub use link_integrity::LinkIntegrityRule;
pub use primary_pipeline::PrimaryPipelineRule;
pub use reachability::ReachabilityRule;
pub use supernode_refs::SupernodeRefsRule;

use crate::diagnostic::Diagnostic;
use pipeflow_model::{Pipeline, PipelineFlow};

/// Trait for implementing validation rules
pub trait ValidationRule {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Whole-document checks
    fn check_flow(&self, _flow: &PipelineFlow) -> Vec<Diagnostic> {
        Vec::new()
    }

    /// Per-pipeline checks; the flow is available for cross-references
    fn check_pipeline(&self, _flow: &PipelineFlow, _pipeline: &Pipeline) -> Vec<Diagnostic> {
        Vec::new()
    }
}

/// Registry of all available validation rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(PrimaryPipelineRule),
                Box::new(ReachabilityRule),
                Box::new(DuplicateIdsRule),
                Box::new(LinkIntegrityRule),
                Box::new(BindingPortsRule),
                Box::new(SupernodeRefsRule),
                Box::new(CardinalityRule),
            ],
        }
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn ValidationRule>] {
        &self.rules
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a custom rule to the registry
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}
