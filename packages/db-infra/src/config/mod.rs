//! Configuration resolution: layered settings and connection selection.

pub mod db;
pub mod settings;
