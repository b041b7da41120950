//! Concurrent discovery of the files an application leaves on disk.
//!
//! Given an [`AppDescriptor`], this crate finds the support directories,
//! preference files, caches, containers and other artifacts that belong to
//! the app, and reduces them to a minimal, annotated list.
//!
//! # Overview
//!
//! The main entry point is [`Discovery`], which combines:
//!
//! - [`LocationLister`]: One-level listing of each search root
//! - [`AppMatcher`] and [`SkipFilter`]: Deciding which candidates belong to the app
//! - [`Accumulator`]: The lock-protected set shared by scan workers
//! - [`ContainerResolver`]: UUID-named sandbox and app-group containers
//! - [`resolve_overrides`]: Force-included paths from override rules
//! - [`reduce`]: Standardization and descendant removal
//! - [`SizeProbe`] and [`IconProvider`]: Annotation of the final list
//! - [`ResultSink`]: Delivery according to the [`RunMode`]
//!
//! # Example
//!
//! ```ignore
//! use sweep_core::{AppDescriptor, Config, RunMode};
//! use sweep_scanner::{AppStore, Discovery};
//! use camino::Utf8Path;
//!
//! let discovery = Discovery::from_config(&Config::default())?;
//! let app = AppDescriptor::from_bundle(Utf8Path::new("/Applications/Bar.app"))?;
//! let store = AppStore::new();
//!
//! let result = discovery
//!     .discover(app, discovery.search_roots(), RunMode::Interactive, &store)
//!     .await;
//! for entry in &result.paths {
//!     println!("{} ({} bytes)", entry.path, entry.size.real);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Discovery::discover (async, runs the pipeline on a blocking thread)
//!     │
//!     ├── seed with the bundle path
//!     ├── directory phase ── rayon over roots ──┐
//!     │                                        ├── Accumulator (Mutex)
//!     ├── file phase ─────── rayon over roots ──┘
//!     ├── ContainerResolver + resolve_overrides
//!     ├── reduce + suppress_lone_trash
//!     ├── annotate (SizeProbe, IconProvider)
//!     │
//!     └── deliver to ResultSink
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod accumulator;
mod containers;
mod enrich;
mod error;
mod location;
mod matcher;
mod overrides;
mod reducer;
mod result;
mod sink;
mod skip;
mod stats;
mod walker;

pub use accumulator::{Accumulator, InsertOutcome};
pub use containers::{
    CONTAINER_METADATA_FILE, CONTAINER_METADATA_KEY, ContainerResolver, GroupContainerLookup,
    LibraryGroupContainers, is_uuid_name,
};
pub use enrich::{DiskUsageProbe, IconProvider, SizeProbe, SymbolicIconProvider, annotate};
pub use error::ScanError;
pub use location::LocationScanner;
pub use matcher::AppMatcher;
pub use overrides::resolve_overrides;
pub use reducer::{is_in_trash, reduce, seed_path, standardize, suppress_lone_trash};
pub use result::{DiscoveredPath, DiscoveryResult};
pub use sink::{AppStore, ResultSink, deliver};
pub use skip::{FileTypeFilter, SkipFilter, SkipReason, SupportedTypes};
pub use stats::{DiscoveryStats, StatsSnapshot};
pub use walker::{EntryKind, Listing, LocationEntry, LocationLister};

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use sweep_core::{AppDescriptor, Config, DiscoveryConfig, RuleSet, RunMode};
use tracing::{debug, error, info};

/// The discovery engine.
///
/// Holds the read-only configuration, rule tables and collaborators shared by
/// every run. Each call to [`discover`](Self::discover) gets its own
/// accumulator and statistics, so runs for different apps may overlap.
///
/// # Cloning
///
/// `Discovery` is cheaply cloneable via internal `Arc` references, which is
/// how a run is moved onto a blocking thread.
#[derive(Clone)]
pub struct Discovery {
    /// Expanded search roots, in configured order.
    search_roots: Arc<[Utf8PathBuf]>,
    /// Expanded per-user containers directory.
    containers_dir: Utf8PathBuf,
    /// Rule tables shared by every run.
    rules: Arc<RuleSet>,
    /// Which entry types may be collected.
    file_types: Arc<dyn FileTypeFilter>,
    /// Size annotation.
    sizes: Arc<dyn SizeProbe>,
    /// Icon annotation.
    icons: Arc<dyn IconProvider>,
    /// App-group container lookup.
    groups: Arc<dyn GroupContainerLookup>,
    /// Dedicated worker pool when the job count is capped.
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Discovery {
    /// Creates an engine from discovery settings and rule tables.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if `max_parallel_jobs` is zero and
    /// [`ScanError::ThreadPool`] if the capped worker pool cannot be built.
    pub fn new(config: &DiscoveryConfig, rules: RuleSet) -> Result<Self, ScanError> {
        let pool = match config.max_parallel_jobs {
            Some(0) => return Err(ScanError::config("max_parallel_jobs must be at least 1")),
            Some(jobs) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .thread_name(|index| format!("appsweep-scan-{index}"))
                    .build()?,
            )),
            None => None,
        };

        let search_roots: Arc<[Utf8PathBuf]> = config.resolved_search_roots().into();
        info!(
            roots = search_roots.len(),
            match_rules = rules.match_rules.len(),
            skip_rules = rules.skip_rules.len(),
            jobs = ?config.max_parallel_jobs,
            "Creating discovery engine"
        );

        Ok(Self {
            search_roots,
            containers_dir: config.resolved_containers_dir(),
            rules: Arc::new(rules),
            file_types: Arc::new(SupportedTypes::new(&config.supported_extensions)),
            sizes: Arc::new(DiskUsageProbe),
            icons: Arc::new(SymbolicIconProvider),
            groups: Arc::new(LibraryGroupContainers::new(
                config.resolved_group_containers_dir(),
            )),
            pool,
        })
    }

    /// Creates an engine from a full configuration.
    ///
    /// # Errors
    ///
    /// See [`Discovery::new`].
    pub fn from_config(config: &Config) -> Result<Self, ScanError> {
        Self::new(&config.discovery, config.rules.rule_set())
    }

    /// Replaces the size probe.
    #[must_use]
    pub fn with_size_probe(mut self, sizes: Arc<dyn SizeProbe>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Replaces the icon provider.
    #[must_use]
    pub fn with_icon_provider(mut self, icons: Arc<dyn IconProvider>) -> Self {
        self.icons = icons;
        self
    }

    /// Replaces the app-group container lookup.
    #[must_use]
    pub fn with_group_lookup(mut self, groups: Arc<dyn GroupContainerLookup>) -> Self {
        self.groups = groups;
        self
    }

    /// Replaces the file type filter.
    #[must_use]
    pub fn with_file_types(mut self, file_types: Arc<dyn FileTypeFilter>) -> Self {
        self.file_types = file_types;
        self
    }

    /// Returns the configured search roots, `~` expanded.
    #[must_use]
    pub fn search_roots(&self) -> Vec<Utf8PathBuf> {
        self.search_roots.to_vec()
    }

    /// Returns the rule tables in use.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Discovers the app's files and delivers the result according to `mode`.
    ///
    /// The pipeline runs on a blocking thread; this future only awaits it.
    /// The result is returned in every mode. If the pipeline panics, the
    /// failure is logged and an empty result is delivered and returned.
    pub async fn discover(
        &self,
        app: AppDescriptor,
        roots: Vec<Utf8PathBuf>,
        mode: RunMode,
        sink: &dyn ResultSink,
    ) -> DiscoveryResult {
        let engine = self.clone();
        let fallback = app.clone();
        let result =
            match tokio::task::spawn_blocking(move || engine.discover_blocking(&app, &roots)).await
            {
                Ok(result) => result,
                Err(err) => {
                    error!(bundle_id = %fallback.bundle_id, error = %err, "Discovery task failed");
                    DiscoveryResult::empty(fallback)
                }
            };

        deliver(sink, mode, &result);
        result
    }

    /// Runs the discovery pipeline on the current thread.
    ///
    /// Nothing is delivered; the caller owns the result.
    #[must_use]
    pub fn discover_blocking(&self, app: &AppDescriptor, roots: &[Utf8PathBuf]) -> DiscoveryResult {
        info!(
            bundle_id = %app.bundle_id,
            path = %app.path,
            web_app = app.web_app,
            roots = roots.len(),
            "Starting discovery"
        );

        let stats = DiscoveryStats::new();
        let collected = Accumulator::new();
        match seed_path(&app.path) {
            Some(seed) => {
                collected.insert(seed);
            }
            None => debug!(path = %app.path, "Bundle is in the trash, not seeding"),
        }

        let matcher = AppMatcher::new(app, &self.rules);
        let skip = SkipFilter::new(&self.rules, self.file_types.as_ref());
        let scanner = LocationScanner::new(&matcher, skip, &collected, &stats);

        // Every directory phase finishes before any file phase starts
        self.for_each_root(roots, |root| scanner.scan_directories(root));
        self.for_each_root(roots, |root| scanner.scan_files(root));

        let containers =
            ContainerResolver::new(&self.containers_dir, self.groups.as_ref()).resolve(app, &stats);
        let overrides = resolve_overrides(matcher.normalized_bundle_id(), &self.rules, &stats);

        let mut paths = collected.into_paths();
        paths.extend(containers);
        paths.extend(overrides);
        let reduced = suppress_lone_trash(reduce(paths));

        let sizes = self.sizes.as_ref();
        let icons = self.icons.as_ref();
        let annotated = self.in_pool(|| annotate(&reduced, sizes, icons));

        let stats = stats.snapshot();
        info!(
            bundle_id = %app.bundle_id,
            paths = annotated.len(),
            examined = stats.examined,
            matched = stats.matched(),
            containers = stats.containers,
            errors = stats.errors,
            "Discovery completed"
        );

        DiscoveryResult {
            app: app.clone(),
            paths: annotated,
            stats,
        }
    }

    /// Runs `scan` over every root in parallel and waits for all of them.
    fn for_each_root<F>(&self, roots: &[Utf8PathBuf], scan: F)
    where
        F: Fn(&Utf8Path) + Sync + Send,
    {
        self.in_pool(|| roots.par_iter().for_each(|root| scan(root)));
    }

    /// Runs `op` inside the capped pool, or the global one when uncapped.
    fn in_pool<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl std::fmt::Debug for Discovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discovery")
            .field("search_roots", &self.search_roots)
            .field("containers_dir", &self.containers_dir)
            .field("rules", &self.rules)
            .field("pool", &self.pool.as_ref().map(|pool| pool.current_num_threads()))
            .finish_non_exhaustive()
    }
}
