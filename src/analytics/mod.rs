// src/analytics/mod.rs
pub mod summary;
