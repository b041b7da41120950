//! Result routing for a discovery run.

use serde::{Deserialize, Serialize};

/// Where a finished discovery result is delivered.
///
/// Resolved once at the orchestrator boundary from the host's flags.
///
/// # Examples
///
/// ```
/// use sweep_core::RunMode;
///
/// assert_eq!(RunMode::from_flags(false, false), RunMode::Interactive);
/// assert_eq!(RunMode::from_flags(true, false), RunMode::Background);
/// assert_eq!(RunMode::from_flags(true, true), RunMode::BulkAppend);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Publish as the currently selected app and paths.
    #[default]
    Interactive,

    /// Compute only; nothing is published (size checks and similar).
    Background,

    /// Append to the bulk store for later reconciliation.
    BulkAppend,
}

impl RunMode {
    /// Resolves the host's `background` and `bulk` flags.
    ///
    /// Bulk mode wins whenever it is requested.
    #[must_use]
    pub const fn from_flags(background: bool, bulk: bool) -> Self {
        match (background, bulk) {
            (_, true) => Self::BulkAppend,
            (true, false) => Self::Background,
            (false, false) => Self::Interactive,
        }
    }

    /// Returns a short lowercase label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Interactive => "interactive",
            Self::Background => "background",
            Self::BulkAppend => "bulk_append",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_wins_over_interactive() {
        assert_eq!(RunMode::from_flags(false, true), RunMode::BulkAppend);
    }

    #[test]
    fn test_serialization_matches_label() {
        for mode in [RunMode::Interactive, RunMode::Background, RunMode::BulkAppend] {
            let json = serde_json::to_string(&mode).expect("serialize");
            assert_eq!(json, format!("\"{}\"", mode.label()));
        }
    }
}
