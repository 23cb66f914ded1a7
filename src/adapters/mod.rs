//! Adapter implementations for port traits.
//!
//! - `live/` — HTTP client for a hosted pipeline
//! - `recording/` — Record interactions to cassettes
//! - `replaying/` — Replay interactions from cassettes

pub mod live;
pub mod recording;
pub mod replaying;
