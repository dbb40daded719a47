//! Input parsing module

pub mod loader;

pub use loader::{load_graph, LoadError};
