//! imgconv — client for a remote image conversion service.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod config;
pub mod format;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
