pub mod auth;
pub mod poll;
pub mod server;

pub use server::{AppState, app, process_update, run, serve};
