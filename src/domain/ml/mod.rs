pub mod artifact;
pub mod confidence;
pub mod feature_registry;
pub mod linear_model;
pub mod metrics;
pub mod normalizer;
