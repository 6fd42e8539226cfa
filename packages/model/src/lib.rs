//! Pipeline-flow document model: types, interchange (de)serialization,
//! palette documents, id generation, and the `ObjectModel` store.
//!
//! Everything here is synchronous and self-contained. The action catalogue
//! and undo machinery live in `pipeflow-editor`; schema upgrades for older
//! documents live in `pipeflow-migrate`.

mod convert;

pub mod error;
pub mod ids;
pub mod interchange;
pub mod palette;
pub mod store;
pub mod types;

pub use error::ModelError;
pub use ids::{flow_seed, IdGenerator};
pub use palette::{Palette, PaletteCategory};
pub use store::{ObjectGeometry, ObjectModel};
pub use types::{
    Cardinality, Comment, Link, LinkKind, Node, NodeKind, Pipeline, PipelineFlow, Port, Runtime,
    SubflowRef, CURRENT_VERSION,
};
