//! Configuration sources, lowest to highest precedence after defaults.

pub mod global_file;
pub mod workspace_file;
