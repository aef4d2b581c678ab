//! Error types for trailhead-core

use thiserror::Error;

/// Main error type for the trailhead-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// An explicitly requested namespace could not be probed
    #[error("namespace unavailable: {namespace}: {reason}")]
    NamespaceUnavailable { namespace: String, reason: String },

    /// A remote endpoint probe failed (connection, auth, or timeout)
    #[error("remote probe failed for {endpoint}: {reason}")]
    RemoteProbe { endpoint: String, reason: String },

    /// Every probed namespace was reachable but held no session stores
    #[error("no session stores found in any probed namespace")]
    NoSourcesFound,

    /// Malformed remote endpoint spec (expected user@host)
    #[error("invalid remote endpoint: {0}")]
    InvalidEndpoint(String),

    /// Store discovery error
    #[error("discovery error in {agent} store: {message}")]
    Discovery { agent: String, message: String },
}

/// Result type alias for trailhead-core
pub type Result<T> = std::result::Result<T, Error>;
