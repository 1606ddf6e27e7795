//! Business logic that sits above the repositories.

pub mod analytics;
