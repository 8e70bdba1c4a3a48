//! Shared utilities

pub mod preprocessing;

pub use preprocessing::{ModelInputAdapter, ModelInputs};
