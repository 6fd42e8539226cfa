use pipeflow_migrate::{base_version, upgrade, LATEST_VERSION};
use serde_json::json;

fn v1_document() -> serde_json::Value {
    json!({
        "doc_type": "pipeline",
        "version": "1.0",
        "id": "flow-legacy",
        "primary_pipeline": "p1",
        "pipelines": [{
            "id": "p1",
            "runtime": "spark",
            "nodes": [
                {
                    "id": "source",
                    "type": "binding",
                    "x_pos": 10,
                    "y_pos": 10,
                    "output": { "id": "outPort" }
                },
                {
                    "id": "transform",
                    "type": "execution_node",
                    "op": "filter-rows",
                    "label": "Filter",
                    "x_pos": 150,
                    "y_pos": 10,
                    "input": {
                        "id": "inPort",
                        "link": {
                            "node_id_ref": "source",
                            "port_id_ref": "outPort",
                            "pipeline_id_ref": "p1"
                        }
                    },
                    "output": { "id": "outPort" }
                }
            ]
        }]
    })
}

#[test]
fn test_v1_document_reaches_latest_version() {
    let upgraded = upgrade(v1_document()).unwrap();

    assert_eq!(base_version(&upgraded).unwrap(), LATEST_VERSION);
    assert_eq!(upgraded["version"], json!("3.0"));

    // geometry hoisted
    let transform = &upgraded["pipelines"][0]["nodes"][1];
    assert!(transform.get("x_pos").is_none());
    assert_eq!(transform["app_data"]["ui_data"]["x_pos"], json!(150));
    assert_eq!(transform["app_data"]["ui_data"]["label"], json!("Filter"));

    // singular ports now arrays, deprecated field gone
    let links = transform["inputs"][0]["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["node_id_ref"], json!("source"));
    assert!(links[0].get("pipeline_id_ref").is_none());

    // runtime promoted to the registry
    assert_eq!(upgraded["pipelines"][0]["runtime_ref"], json!("runtime-1"));
    assert_eq!(upgraded["runtimes"][0]["name"], json!("spark"));
}

#[test]
fn test_upgrade_is_idempotent() {
    let once = upgrade(v1_document()).unwrap();
    let twice = upgrade(once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_v2_document_only_runs_remaining_steps() {
    let doc = json!({
        "version": "2.0",
        "id": "flow-v2",
        "primary_pipeline": "p1",
        "pipelines": [{
            "id": "p1",
            "runtime": "airflow",
            "nodes": [{
                "id": "n1",
                "type": "execution_node",
                "app_data": { "ui_data": { "x_pos": 5, "y_pos": 6 } },
                "inputs": [{ "id": "inPort" }]
            }]
        }]
    });
    let upgraded = upgrade(doc).unwrap();

    assert_eq!(upgraded["version"], json!("3.0"));
    assert_eq!(upgraded["pipelines"][0]["runtime_ref"], json!("runtime-1"));
    // v2 shape untouched by the v1 step
    assert_eq!(
        upgraded["pipelines"][0]["nodes"][0]["app_data"]["ui_data"]["x_pos"],
        json!(5)
    );
}
