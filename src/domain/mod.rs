// Feature order, scaling, model and artifact schema
pub mod ml;

// Port interfaces
pub mod ports;

// Records and response types
pub mod types;

// Domain-specific error types
pub mod errors;
