pub mod auth;
pub mod commands;
pub mod config;
pub mod docker_config;
pub mod error;
pub mod logging;
pub mod output;
