pub mod config;
pub mod portfolio;
