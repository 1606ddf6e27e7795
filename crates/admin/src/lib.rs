//! Hearth Admin library.
//!
//! Catalog and order management for store staff, exposed as a library so
//! the repositories can be reused by the CLI seeder and tested directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
