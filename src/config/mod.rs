//! Environment-driven configuration.

pub mod app;
pub mod db;
pub mod env;
pub mod mail;
