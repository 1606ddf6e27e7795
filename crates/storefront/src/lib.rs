//! Hearth Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Modules
//!
//! - [`catalog`] - Live category tree and product list over a [`catalog::CatalogBackend`]
//! - [`db`] - `PostgreSQL` repositories and the catalog backend
//! - [`session`] - Cart and wishlist contexts
//! - [`services`] - Checkout
//! - [`routes`] - JSON API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
