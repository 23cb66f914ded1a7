//! Record/replay infrastructure for running the CLI without a pipeline host.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
