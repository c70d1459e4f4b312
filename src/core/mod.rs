// Core algorithm exports
pub mod encoder;
pub mod pipeline;
pub mod scoring;
pub mod synthetic;

pub use encoder::{encode, encode_json};
pub use pipeline::{BatchPolicy, Scorer};
pub use scoring::{classify, normalize, to_score_result};
pub use synthetic::{generate_dataset, generate_label, heuristic_score, LabeledSample};
