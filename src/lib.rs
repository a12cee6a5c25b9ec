pub mod compose;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod multilingual;
pub mod orchestrator;
pub mod provider;
pub mod retry;
pub mod store;
pub mod tenant;
