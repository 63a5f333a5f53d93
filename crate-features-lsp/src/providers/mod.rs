//! LSP feature providers

pub mod completion;
