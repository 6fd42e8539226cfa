//! One function per schema step. Each takes the owned document, rewrites it
//! in place, stamps its target version, and hands it back.

use serde_json::{Map, Value};

use crate::error::MigrateError;

/// v1 → v2: node geometry and labels move under `app_data.ui_data`;
/// singular `input`/`output`/`link` fields become one-element arrays.
pub(crate) fn to_v2(mut doc: Value) -> Result<Value, MigrateError> {
    {
        let pipelines = pipelines_mut(&mut doc)?;
        for pipeline in pipelines.iter_mut() {
            let Some(nodes) = pipeline.get_mut("nodes").and_then(Value::as_array_mut) else {
                continue;
            };
            for node in nodes.iter_mut() {
                let Some(node) = node.as_object_mut() else {
                    continue;
                };
                hoist_ui_fields(node);
                pluralize_ports(node);
                pluralize_port_links(node);
            }
        }
    }
    set_version(&mut doc, "2.0");
    Ok(doc)
}

/// v2 → v3: per-pipeline `runtime` strings become `runtime_ref`s into a
/// deduplicated top-level `runtimes` registry; the deprecated
/// `pipeline_id_ref` field is dropped from port link references.
pub(crate) fn to_v3(mut doc: Value) -> Result<Value, MigrateError> {
    let mut registry = existing_runtimes(&doc);
    {
        let pipelines = pipelines_mut(&mut doc)?;
        for pipeline in pipelines.iter_mut() {
            let Some(pipeline) = pipeline.as_object_mut() else {
                continue;
            };
            if let Some(Value::String(name)) = pipeline.remove("runtime") {
                let id = registry_id(&mut registry, &name);
                pipeline.insert("runtime_ref".to_string(), Value::String(id));
            }
            if let Some(nodes) = pipeline.get_mut("nodes").and_then(Value::as_array_mut) {
                for node in nodes.iter_mut() {
                    strip_link_pipeline_refs(node);
                }
            }
        }
    }
    write_runtimes(&mut doc, registry);
    set_version(&mut doc, "3.0");
    Ok(doc)
}

fn pipelines_mut(doc: &mut Value) -> Result<&mut Vec<Value>, MigrateError> {
    doc.get_mut("pipelines")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| MigrateError::MalformedDocument("pipelines is not an array".to_string()))
}

fn set_version(doc: &mut Value, version: &str) {
    if let Some(obj) = doc.as_object_mut() {
        obj.insert("version".to_string(), Value::String(version.to_string()));
    }
}

fn hoist_ui_fields(node: &mut Map<String, Value>) {
    let mut moved = Map::new();
    for key in ["x_pos", "y_pos", "label"] {
        if let Some(value) = node.remove(key) {
            moved.insert(key.to_string(), value);
        }
    }
    if moved.is_empty() {
        return;
    }
    let app_data = node
        .entry("app_data")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(app_data) = app_data.as_object_mut() else {
        return;
    };
    let ui_data = app_data
        .entry("ui_data")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(ui_data) = ui_data.as_object_mut() {
        for (key, value) in moved {
            ui_data.entry(key).or_insert(value);
        }
    }
}

fn pluralize_ports(node: &mut Map<String, Value>) {
    for (singular, plural) in [("input", "inputs"), ("output", "outputs")] {
        if let Some(port) = node.remove(singular) {
            if !node.contains_key(plural) {
                node.insert(plural.to_string(), Value::Array(vec![port]));
            }
        }
    }
}

fn pluralize_port_links(node: &mut Map<String, Value>) {
    for plural in ["inputs", "outputs"] {
        let Some(ports) = node.get_mut(plural).and_then(Value::as_array_mut) else {
            continue;
        };
        for port in ports.iter_mut() {
            let Some(port) = port.as_object_mut() else {
                continue;
            };
            if let Some(link) = port.remove("link") {
                if !port.contains_key("links") {
                    port.insert("links".to_string(), Value::Array(vec![link]));
                }
            }
        }
    }
}

fn strip_link_pipeline_refs(node: &mut Value) {
    let Some(node) = node.as_object_mut() else {
        return;
    };
    for plural in ["inputs", "outputs"] {
        let Some(ports) = node.get_mut(plural).and_then(Value::as_array_mut) else {
            continue;
        };
        for port in ports.iter_mut() {
            let Some(links) = port.get_mut("links").and_then(Value::as_array_mut) else {
                continue;
            };
            for link in links.iter_mut() {
                if let Some(link) = link.as_object_mut() {
                    link.remove("pipeline_id_ref");
                }
            }
        }
    }
}

fn existing_runtimes(doc: &Value) -> Vec<(String, String)> {
    let mut registry = Vec::new();
    if let Some(runtimes) = doc.get("runtimes").and_then(Value::as_array) {
        for runtime in runtimes {
            let id = runtime.get("id").and_then(Value::as_str);
            let name = runtime.get("name").and_then(Value::as_str);
            if let (Some(id), Some(name)) = (id, name) {
                registry.push((id.to_string(), name.to_string()));
            }
        }
    }
    registry
}

/// Id of the registry entry for `name`, creating one when absent
fn registry_id(registry: &mut Vec<(String, String)>, name: &str) -> String {
    if let Some((id, _)) = registry.iter().find(|(_, n)| n == name) {
        return id.clone();
    }
    let mut index = registry.len() + 1;
    let id = loop {
        let candidate = format!("runtime-{index}");
        if registry.iter().all(|(id, _)| *id != candidate) {
            break candidate;
        }
        index += 1;
    };
    registry.push((id.clone(), name.to_string()));
    id
}

fn write_runtimes(doc: &mut Value, registry: Vec<(String, String)>) {
    if registry.is_empty() {
        return;
    }
    let runtimes = registry
        .into_iter()
        .map(|(id, name)| {
            let mut entry = Map::new();
            entry.insert("id".to_string(), Value::String(id));
            entry.insert("name".to_string(), Value::String(name));
            Value::Object(entry)
        })
        .collect();
    if let Some(obj) = doc.as_object_mut() {
        obj.insert("runtimes".to_string(), Value::Array(runtimes));
    }
}
