//! Structural and referential validation for pipeline flows.
//!
//! Rule-based in the style of a linter: every rule inspects the whole
//! document or one pipeline and contributes diagnostics; a validation pass
//! reports all findings rather than stopping at the first.

mod diagnostic;
mod error;
mod rules;
mod validator;

pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use error::ValidationError;
pub use rules::{
    BindingPortsRule, CardinalityRule, DuplicateIdsRule, LinkIntegrityRule, PrimaryPipelineRule,
    ReachabilityRule, RuleRegistry, SupernodeRefsRule, ValidationRule,
};
pub use validator::{ensure_valid, validate_flow, ValidateOptions};
