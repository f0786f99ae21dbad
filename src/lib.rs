pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod interactive;
pub mod logging;
pub mod render;
