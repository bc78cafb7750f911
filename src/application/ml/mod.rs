pub mod feature_builder;
pub mod linear_regression;
pub mod training_pipeline;
