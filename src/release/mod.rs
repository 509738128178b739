//! Release layer
//!
//! Replaces GitHub releases for freshly versioned SDK packages and triggers their
//! regeneration.
//!
//! # Modules
//!
//! - [`host`]: `ReleaseHost` trait over the hosting platform's release and tag API
//! - [`github`]: GitHub REST implementation of `ReleaseHost`
//! - [`orchestrator`]: Delete-then-create replacement of one `<language>@<version>` release
//! - [`generator`]: Runs the external SDK generator for a released version
//! - [`pipeline`]: Per-language resolve, bump, release and generate flow
//! - [`prune`]: Deletes the most recent releases
//! - [`error`]: Errors returned by the hosting platform

pub mod error;
pub mod generator;
pub mod github;
pub mod host;
pub mod orchestrator;
pub mod pipeline;
pub mod prune;
