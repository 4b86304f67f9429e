pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod feed;
pub mod pipeline;
pub mod store;
