//! Strata engine crate.
//!
//! This crate owns the value types shared by capture and scene construction:
//! geometry, paint, fonts and raster helpers.

pub mod coords;
pub mod logging;
pub mod paint;
pub mod raster;
pub mod text;
