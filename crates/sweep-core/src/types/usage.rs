//! Size and icon annotations attached to discovered paths.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Disk usage of a path.
///
/// `real` is the space actually allocated on disk; `logical` is the sum of
/// file lengths. They differ for sparse, compressed, or tiny files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DiskUsage {
    /// Allocated bytes.
    pub real: u64,
    /// Logical bytes.
    pub logical: u64,
}

impl DiskUsage {
    /// Creates a usage value.
    #[inline]
    #[must_use]
    pub const fn new(real: u64, logical: u64) -> Self {
        Self { real, logical }
    }
}

impl Add for DiskUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            real: self.real.saturating_add(rhs.real),
            logical: self.logical.saturating_add(rhs.logical),
        }
    }
}

impl AddAssign for DiskUsage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// The broad kind of icon a host should render for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum IconKind {
    /// An application bundle.
    Application,
    /// A plain directory.
    Folder,
    /// A preferences property list.
    Preferences,
    /// Any other regular file.
    Document,
    /// A symlink or something else.
    Generic,
}

impl IconKind {
    /// The SF Symbols name a host can use for this kind.
    #[must_use]
    pub const fn symbol_name(self) -> &'static str {
        match self {
            Self::Application => "app",
            Self::Folder => "folder",
            Self::Preferences => "gearshape",
            Self::Document => "doc",
            Self::Generic => "questionmark.square",
        }
    }
}

/// Opaque icon handle returned by an icon provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Icon {
    /// What the icon depicts.
    pub kind: IconKind,
}

impl Icon {
    /// Creates an icon handle of the given kind.
    #[must_use]
    pub const fn new(kind: IconKind) -> Self {
        Self { kind }
    }
}
