// src/models/mod.rs
pub mod garch;
pub mod garch_fx;
pub mod heston;
pub mod model;
pub mod regime;
