//! End-to-end validation of interchange documents: load through the model,
//! then run the full rule registry.

use pipeflow_model::PipelineFlow;
use pipeflow_validator::{ensure_valid, validate_flow, ValidateOptions};
use serde_json::json;

#[test]
fn test_well_formed_document_is_clean() {
    let doc = json!({
        "doc_type": "pipeline",
        "version": "3.0",
        "id": "flow-ok",
        "primary_pipeline": "p1",
        "pipelines": [
            {
                "id": "p1",
                "nodes": [
                    { "id": "entry", "type": "binding", "outputs": [{ "id": "outPort" }] },
                    {
                        "id": "work", "type": "execution_node", "op": "transform",
                        "inputs": [{
                            "id": "inPort",
                            "links": [{ "id": "l1", "node_id_ref": "entry", "port_id_ref": "outPort" }]
                        }],
                        "outputs": [{ "id": "outPort" }]
                    },
                    { "id": "group", "type": "super_node",
                      "subflow_ref": { "pipeline_id_ref": "sub" },
                      "inputs": [{
                          "id": "inPort",
                          "links": [{ "id": "l2", "node_id_ref": "work", "port_id_ref": "outPort" }]
                      }] }
                ]
            },
            {
                "id": "sub",
                "nodes": [
                    { "id": "sub-entry", "type": "binding", "outputs": [{ "id": "outPort" }] },
                    { "id": "sub-exit", "type": "binding", "inputs": [{
                        "id": "inPort",
                        "links": [{ "id": "l3", "node_id_ref": "sub-entry", "port_id_ref": "outPort" }]
                    }] }
                ]
            }
        ]
    });

    let flow = PipelineFlow::from_value(doc).unwrap();
    let diagnostics = validate_flow(&flow, ValidateOptions::default());
    assert!(diagnostics.is_empty(), "unexpected findings: {diagnostics:?}");
}

#[test]
fn test_broken_document_reports_every_problem() {
    let doc = json!({
        "version": "3.0",
        "id": "flow-bad",
        "primary_pipeline": "p1",
        "pipelines": [
            {
                "id": "p1",
                "nodes": [
                    {
                        "id": "work", "type": "execution_node", "op": "transform",
                        "inputs": [{
                            "id": "inPort",
                            "links": [{ "id": "l1", "node_id_ref": "ghost" }]
                        }]
                    },
                    { "id": "lost", "type": "super_node",
                      "subflow_ref": { "pipeline_id_ref": "missing" } }
                ]
            },
            { "id": "unreachable", "nodes": [] }
        ]
    });

    let flow = PipelineFlow::from_value(doc).unwrap();
    let err = ensure_valid(&flow).unwrap_err();
    let rules: Vec<&str> = err.diagnostics.iter().map(|d| d.rule.as_str()).collect();

    assert!(rules.contains(&"link-integrity"));
    assert!(rules.contains(&"supernode-refs"));
    assert!(rules.contains(&"pipeline-reachability"));
}

#[test]
fn test_cyclic_document_fails_validation() {
    let doc = json!({
        "version": "3.0",
        "id": "flow-cycle",
        "primary_pipeline": "p1",
        "pipelines": [
            { "id": "p1", "nodes": [
                { "id": "down", "type": "super_node", "subflow_ref": { "pipeline_id_ref": "sub" } }
            ]},
            { "id": "sub", "nodes": [
                { "id": "up", "type": "super_node", "subflow_ref": { "pipeline_id_ref": "p1" } }
            ]}
        ]
    });

    let flow = PipelineFlow::from_value(doc).unwrap();
    let err = ensure_valid(&flow).unwrap_err();
    assert!(err
        .diagnostics
        .iter()
        .any(|d| d.message.contains("containment cycle")));
}

#[test]
fn test_overloaded_port_is_advisory_only() {
    // two links into one {0,1} port: a warning, never a load failure
    let doc = json!({
        "version": "3.0",
        "id": "flow-warn",
        "primary_pipeline": "p1",
        "pipelines": [{
            "id": "p1",
            "nodes": [
                { "id": "a", "type": "execution_node", "outputs": [{ "id": "outPort" }] },
                { "id": "b", "type": "execution_node", "outputs": [{ "id": "outPort" }] },
                {
                    "id": "sink", "type": "execution_node",
                    "inputs": [{
                        "id": "inPort",
                        "app_data": { "ui_data": { "cardinality": { "min": 0, "max": 1 } } },
                        "links": [
                            { "id": "l1", "node_id_ref": "a", "port_id_ref": "outPort" },
                            { "id": "l2", "node_id_ref": "b", "port_id_ref": "outPort" }
                        ]
                    }]
                }
            ]
        }]
    });

    let flow = PipelineFlow::from_value(doc).unwrap();
    assert!(ensure_valid(&flow).is_ok());

    let diagnostics = validate_flow(&flow, ValidateOptions::default());
    let warnings: Vec<_> = diagnostics.iter().filter(|d| !d.is_error()).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].rule, "cardinality");
}
