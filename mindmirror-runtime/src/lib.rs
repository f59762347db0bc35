pub mod backend;
pub mod config_store;
pub mod mic;

pub use backend::HttpBackend;
pub use config_store::ConfigStore;
