//! Shared vocabulary for the barnum workspace.
//!
//! Everything that crosses a crate boundary lives here: the circus domain
//! models, the error taxonomy, the run [`config::Config`] and the
//! [`dispatch::CommandRunner`] port that the dispatcher executes through.

pub mod circus;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod passthrough;
pub mod utils;
