//! Shared pieces of the `cmdtree` and `cmdtree-run` binaries.

pub mod output;
pub mod telemetry;
