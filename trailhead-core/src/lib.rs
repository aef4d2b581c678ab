//! # trailhead-core
//!
//! Core library for trailhead - a cross-environment session-store resolver
//! for AI-coding-assistant conversation logs.
//!
//! This library provides:
//! - A bidirectional codec between workspace paths and the flattened
//!   directory names the assistants' own storage layers produce
//! - Detection of which filesystem namespaces the current process can see
//!   (native OS, Windows compatibility layer, the Windows host from inside
//!   that layer, SSH remotes)
//! - Aggregation of per-namespace session stores into one deduplicated,
//!   stable-ordered list
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use trailhead_core::{Config, Selection, SourceResolver};
//!
//! let config = Config::load().expect("failed to load config");
//! let mut resolver = SourceResolver::new(&config);
//!
//! let resolution = resolver.resolve(&Selection::auto()).expect("resolution failed");
//! for store in &resolution.sources {
//!     println!("{} [{}] {}", store.environment, store.agent, store.root.display());
//! }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use resolver::{
    aggregate, list_session_files, list_workspaces, Selection, SourceResolver, Workspace,
};
pub use types::*;

// Public modules
pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod remote;
pub mod resolver;
pub mod types;
