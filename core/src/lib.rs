//! Discovery, resolution, command construction and concurrent dispatch of
//! circus control commands. The [`orchestrator`] ties them together per scope.

pub mod circus_config;
pub mod command;
pub mod discovery;
pub mod dispatcher;
pub mod orchestrator;
pub mod resolver;
pub mod roster;
pub mod status;
pub mod system;
pub mod units;
pub mod watchers;
