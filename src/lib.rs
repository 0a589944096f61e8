//! Odds Feed Engine - Main Library
//!
//! Thin presentation layer over the `oddsfeed` engine: re-exports the
//! workspace library and hosts the replay binaries under `src/bin/`.

// Re-export the workspace library for convenience
pub use oddsfeed;
