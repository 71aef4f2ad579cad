//! Terminal display utilities for CLI output.
//!
//! Provides styled tables and a shared color theme.

pub mod tables;
pub mod theme;

pub use tables::{TableBuilder, create_cluster_table, create_neighbors_table};
pub use theme::{THEME, Theme, Tone};
