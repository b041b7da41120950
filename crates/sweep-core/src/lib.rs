//! Core types, rule tables, and configuration for appsweep.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`AppDescriptor`] and [`normalize_name`] for describing the target app
//! - [`MatchRule`], [`SkipRule`] and [`RuleSet`] for the static rule tables
//! - [`DiskUsage`] and [`Icon`] annotations
//! - [`RunMode`] for result routing
//! - [`Config`] and friends, loaded from JSON
//! - A minimal [`plist`] reader for `Info.plist` and container metadata

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod plist;
pub mod types;

pub use config::{Config, DiscoveryConfig, RuleConfig, expand_home};
pub use error::{ConfigError, PlistError};
pub use types::{
    AppDescriptor, DiskUsage, Icon, IconKind, Keywords, MatchRule, RuleSet, RunMode, SkipRule,
    info_plist_path, normalize_name,
};
