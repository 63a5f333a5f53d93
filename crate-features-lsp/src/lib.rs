//! crate-features-lsp - completion of feature names in Cargo.toml
//!
//! When the cursor opens a string inside a dependency's `features = [...]`
//! list, the server finds the dependency the list belongs to and suggests
//! the features it declares: read from the dependency's own manifest for
//! `path` dependencies, or from the crates.io API otherwise.

pub mod backend;
pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod features;
pub mod parsers;
pub mod providers;
pub mod registries;
pub mod utils;
