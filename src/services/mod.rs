// Service exports
pub mod model_store;

pub use model_store::{ModelArtifact, ModelStore, ModelStoreError};
