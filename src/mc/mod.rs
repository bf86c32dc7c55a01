// src/mc/mod.rs
pub mod ensemble;
pub mod forecast_engine;
