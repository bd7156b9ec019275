//! Error types for registry loading, channel resolution, and playlist output.

use std::path::PathBuf;

use thiserror::Error;

use crate::channel::Provider;

/// Failure to turn a registry entry into a playable stream URL.
///
/// A `ResolveError` is fatal to the affected channel only; the playlist
/// assembler records it and continues with the remaining channels.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Display name not present in the provider's registry group.
    #[error("unknown channel '{name}' in the {provider} group")]
    UnknownChannel { provider: Provider, name: String },

    /// Provider API answered with a non-success HTTP status.
    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16 },

    /// Provider API answered 2xx but the expected JSON field is absent.
    #[error("upstream response is missing '{field}'")]
    MalformedResponse { field: &'static str },

    /// Registry entry promises a fixed URL but carries none.
    #[error("channel '{name}' has no stream URL in the registry")]
    MissingUrl { name: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Failure to load or validate the channel registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read registry file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse channel registry: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A `direct` entry without a `url` can never resolve; reject it up front.
    #[error("direct channel '{name}' has no url")]
    MissingUrl { name: String },
}

/// Failure to write the rendered playlist document.
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// The output path names an existing directory; nothing is written.
    #[error("output path '{0}' is a directory")]
    PathIsDirectory(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
