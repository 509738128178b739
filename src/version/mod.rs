//! Version resolution layer
//!
//! Finds the latest published version of each SDK package and computes the next one.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registries │────▶│   Fetcher   │────▶│   Semver    │
//! │ (endpoints) │     │(retry, fall-│     │ (sort, bump)│
//! └─────────────┘     │    back)    │     └─────────────┘
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`endpoint`]: Endpoint trait and the HTTP implementation with per-endpoint extractors
//! - [`fetcher`]: Bounded retry and first-success-wins fallback across endpoints
//! - [`registries`]: Endpoint sets for PyPI, npm, the Go proxy and Maven Central
//! - [`semver`]: Version parsing, ordering and bumping
//! - [`error`]: Error types for registry lookups
//! - [`types`]: Languages and bump types

pub mod endpoint;
pub mod error;
pub mod fetcher;
pub mod registries;
pub mod semver;
pub mod types;
