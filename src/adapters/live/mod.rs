//! Live adapters that talk to a real pipeline host.

pub mod pipeline_server;
