//! Sfoglia Kernel Library
//!
//! This library exposes kernel internals for integration testing.
//! The main entry point for running the server is the `sfoglia` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod nav;
pub mod routes;
pub mod session;
pub mod state;
