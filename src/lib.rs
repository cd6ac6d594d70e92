//! # Lookalike
//!
//! Finds visually similar images in a folder tree and helps the user sweep
//! redundant copies to the trash.
//!
//! ## Core Philosophy
//! - **Deterministic** - the same folder always produces the same groups,
//!   because a wrong group means a wrong file gets deleted
//! - **Never destroy** - removable files go to the OS trash, never `rm`
//! - **One keeper per group** - every group has exactly one image the tool
//!   recommends keeping
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation
//! layers:
//! - `core` - fingerprinting, clustering, keeper selection, discard
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - typed error taxonomy

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{LookalikeError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
