pub mod artifact_store;
pub mod dataset;
pub mod http_client_factory;
pub mod mock;
pub mod yahoo;
