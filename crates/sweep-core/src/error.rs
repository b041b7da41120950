//! Error types for the sweep-core crate.
//!
//! This module provides [`ConfigError`] for configuration loading and
//! validation, and [`PlistError`] for property list reads.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use sweep_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/some/path"));
/// assert!(error.to_string().contains("/some/path"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A required directory does not exist.
    #[error("missing required directory: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while reading a property list.
///
/// A missing key is not an error; readers return `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum PlistError {
    /// The file could not be read.
    #[error("failed to read property list {path}: {source}")]
    Io {
        /// The property list path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a property list this crate understands.
    #[error("malformed property list {path}: {reason}")]
    Malformed {
        /// The property list path.
        path: Utf8PathBuf,
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl PlistError {
    /// Returns the path of the property list that failed.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::Io { path, .. } | Self::Malformed { path, .. } => path,
        }
    }

    /// Returns `true` if the file simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_path_display() {
        let error = ConfigError::InvalidPath {
            path: Utf8PathBuf::from("/invalid/path"),
            reason: "relative search root".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("/invalid/path"));
        assert!(msg.contains("relative search root"));
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::invalid_option("max_parallel_jobs", "must be positive");
        let msg = error.to_string();
        assert!(msg.contains("max_parallel_jobs"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_plist_not_found() {
        let error = PlistError::Io {
            path: Utf8PathBuf::from("/Applications/Bar.app/Contents/Info.plist"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(error.is_not_found());
        assert!(error.to_string().contains("Info.plist"));
    }

    #[test]
    fn test_plist_malformed() {
        let error = PlistError::Malformed {
            path: Utf8PathBuf::from("meta.plist"),
            reason: "truncated trailer",
        };
        assert!(!error.is_not_found());
        assert_eq!(error.path().as_str(), "meta.plist");
        assert!(error.to_string().contains("truncated trailer"));
    }
}
