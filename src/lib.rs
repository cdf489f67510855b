pub mod catalog;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod resolver;
pub mod selector;
pub mod types;
