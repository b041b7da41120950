//! Error types for the sweep-scanner crate.
//!
//! This module provides the [`ScanError`] type for errors that can occur
//! while listing locations, reading container metadata, and building the
//! engine.

use camino::Utf8PathBuf;
use sweep_core::PlistError;

/// Errors that can occur during discovery.
///
/// None of these abort a discovery run; the engine logs them and carries on
/// with whatever it could collect.
///
/// # Error Recovery Strategy
///
/// - **Listing errors** ([`ScanError::ListDir`], [`ScanError::Walk`]): Log, skip the location
/// - **Metadata errors** ([`ScanError::Plist`]): Log, skip the container
/// - **Build errors** ([`ScanError::Config`], [`ScanError::ThreadPool`]): Returned to the caller
///
/// # Examples
///
/// ```
/// use sweep_scanner::ScanError;
///
/// fn handle_error(err: ScanError) {
///     match err {
///         ScanError::ListDir { path, .. } => eprintln!("Cannot list: {path}"),
///         ScanError::Walk(e) => eprintln!("Walk error: {e}"),
///         ScanError::Plist(e) => eprintln!("Metadata error: {e}"),
///         ScanError::Config(msg) => eprintln!("Config error: {msg}"),
///         ScanError::NonUtf8Path(p) => eprintln!("Invalid path: {}", p.display()),
///         ScanError::ThreadPool(e) => eprintln!("Thread pool error: {e}"),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A location could not be listed.
    #[error("failed to list directory {path}: {source}")]
    ListDir {
        /// The location that couldn't be listed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An entry inside a location could not be read.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// A property list could not be read.
    #[error(transparent)]
    Plist(#[from] PlistError),

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A path is not valid UTF-8.
    ///
    /// Candidate names are compared as text, so such entries are skipped.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// The worker pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ScanError {
    /// Creates a new [`ScanError::ListDir`] error.
    #[inline]
    pub fn list_dir(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::ListDir {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` if the location simply does not exist.
    ///
    /// Most configured roots are absent on any given machine, so callers log
    /// these at a lower level.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ListDir { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::Walk(err) => err
                .io_error()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound),
            Self::Plist(err) => err.is_not_found(),
            Self::Config(_) | Self::NonUtf8Path(_) | Self::ThreadPool(_) => false,
        }
    }

    /// Returns the path associated with this error, if any.
    ///
    /// Logged alongside the error so failures can be traced to a location.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::ListDir { path, .. } => Some(path),
            Self::Plist(err) => Some(err.path()),
            Self::Walk(_) | Self::Config(_) | Self::NonUtf8Path(_) | Self::ThreadPool(_) => None,
        }
    }
}
