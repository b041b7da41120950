//! Domain types for appsweep.
//!
//! - [`app`] - The target application and name normalization
//! - [`rules`] - Override and skip rule tables
//! - [`usage`] - Size and icon annotations
//! - [`mode`] - Result routing
//!
//! All public types are re-exported at the crate root:
//!
//! ```
//! use sweep_core::{AppDescriptor, DiskUsage, MatchRule, RunMode, RuleSet, SkipRule};
//! ```

mod app;
mod mode;
mod rules;
mod usage;

pub use app::{AppDescriptor, info_plist_path, normalize_name};
pub use mode::RunMode;
pub use rules::{Keywords, MatchRule, RuleSet, SkipRule};
pub use usage::{DiskUsage, Icon, IconKind};
