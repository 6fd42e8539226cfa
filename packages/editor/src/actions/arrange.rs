use pipeflow_model::{ModelError, ObjectGeometry, ObjectModel};

use super::{require_pipeline, split_objects};

/// Offsets nodes and comments by one delta. Undo applies the inverse delta.
#[derive(Debug, Clone)]
pub struct MoveObjects {
    pipeline_id: String,
    object_ids: Vec<String>,
    dx: f64,
    dy: f64,
}

impl MoveObjects {
    pub fn new(pipeline_id: impl Into<String>, object_ids: Vec<String>, dx: f64, dy: f64) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            object_ids,
            dx,
            dy,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        store.move_objects(&self.pipeline_id, &self.object_ids, self.dx, self.dy)
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        store.move_objects(&self.pipeline_id, &self.object_ids, -self.dx, -self.dy)
    }
}

/// Sets absolute geometry on a batch of objects, capturing the previous
/// geometry of each for undo.
#[derive(Debug, Clone)]
pub struct SizeAndPositionObjects {
    pipeline_id: String,
    geometries: Vec<(String, ObjectGeometry)>,
    previous: Vec<(String, ObjectGeometry)>,
    applied: bool,
}

impl SizeAndPositionObjects {
    pub fn new(pipeline_id: impl Into<String>, geometries: Vec<(String, ObjectGeometry)>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            geometries,
            previous: Vec::new(),
            applied: false,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        require_pipeline(store, &self.pipeline_id)?;
        let ids: Vec<String> = self.geometries.iter().map(|(id, _)| id.clone()).collect();
        split_objects(store, &self.pipeline_id, &ids)?;

        for (id, geometry) in &self.geometries {
            let prev = store.set_object_geometry(&self.pipeline_id, id, *geometry)?;
            if !self.applied {
                self.previous.push((id.clone(), prev));
            }
        }
        self.applied = true;
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        for (id, prev) in self.previous.iter().rev() {
            store.set_object_geometry(&self.pipeline_id, id, *prev)?;
        }
        Ok(())
    }
}
