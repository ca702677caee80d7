//! Terminal front-end shared by the `barnum` and `bailey` binaries.

pub mod commands;
pub mod terminal;
