//! End-to-end scenarios across the workspace crates, run against temporary
//! users trees and recording runners.

#[cfg(test)]
mod support;

mod discovery;
mod dispatch;
