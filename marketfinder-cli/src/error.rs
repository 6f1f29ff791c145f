//! Error types emitted by the marketfinder CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use marketfinder_core::{
    CatalogError, DirectoryError, GeoError, PersistListingsError, SlugGrammarError,
    SqliteListingStoreError,
};
use thiserror::Error;

/// Errors emitted by the marketfinder CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Coordinates, radius or unit could not be parsed.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] GeoError),
    /// A slug or selection flag could not be combined with the others.
    #[error("conflicting arguments: {message}")]
    ConflictingArguments { message: &'static str },
    /// Opening a catalog or listings file failed.
    #[error("failed to open {field} at {path:?}: {source}")]
    OpenInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The catalog definition was rejected.
    #[error("invalid catalog at {path:?}: {source}")]
    InvalidCatalog {
        path: Utf8PathBuf,
        #[source]
        source: CatalogError,
    },
    /// The catalog does not fit the slug grammar.
    #[error(transparent)]
    SlugGrammar(#[from] SlugGrammarError),
    /// Listings JSON could not be decoded.
    #[error("failed to parse listings JSON at {path:?}: {source}")]
    ParseListings {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Opening the listing store failed.
    #[error(transparent)]
    OpenStore(#[from] SqliteListingStoreError),
    /// Creating the database's parent directory failed.
    #[error("failed to create parent directory for {path:?}: {source}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Persisting listings to SQLite failed.
    #[error("failed to persist listings to {path:?}: {source}")]
    PersistListings {
        path: Utf8PathBuf,
        #[source]
        source: PersistListingsError,
    },
    /// A directory operation failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
