pub mod cli;
pub mod config;
pub mod data;
pub mod query;
pub mod roster;
pub mod server;
