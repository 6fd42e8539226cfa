pub mod inspect;
pub mod migrate;
pub mod validate;

pub use inspect::{inspect, InspectArgs};
pub use migrate::{migrate, MigrateArgs};
pub use validate::{validate, ValidateArgs};
