pub mod collision;
pub mod config;
pub mod constants;
pub mod engine;
pub mod ghost_ai;
pub mod grid;
pub mod input;
pub mod layout;
pub mod logging;
pub mod store;
pub mod types;
