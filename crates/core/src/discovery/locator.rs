//! Recursive asset locator with per-run memoization.

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::config::DiscoveryConfig;
use super::error::DiscoveryError;
use super::types::{ConversionUnit, DiscoveryMode, ResolvedUnit, UnitKind};

/// Stem that marks the primary audio stream.
const AUDIO_STEM: &str = "audio";

/// Finds convertible units and resolves their audio streams.
///
/// Lookups are cached for as long as the locator lives, so a locator should
/// be scoped to a single batch run.
pub struct AssetLocator {
    config: DiscoveryConfig,
    audio_cache: Mutex<HashMap<PathBuf, Option<PathBuf>>>,
    title_cache: Mutex<HashMap<PathBuf, Result<String, DiscoveryError>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

fn matches_any(value: &str, candidates: &[String]) -> bool {
    candidates
        .iter()
        .any(|c| c.trim_start_matches('.').eq_ignore_ascii_case(value))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| matches_any(ext, extensions))
}

impl AssetLocator {
    /// Creates a locator with empty caches.
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            audio_cache: Mutex::new(HashMap::new()),
            title_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a locator with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(DiscoveryConfig::default())
    }

    /// Enumerates units across several roots, dropping duplicates.
    ///
    /// Overlapping roots (one nested inside another) yield each source once.
    pub fn discover_all(&self, roots: &[PathBuf]) -> Vec<ConversionUnit> {
        let mut seen = HashSet::new();
        let mut units = Vec::new();
        for root in roots {
            for unit in self.discover(root) {
                if seen.insert(unit.source_path.clone()) {
                    units.push(unit);
                } else {
                    debug!("Skipping duplicate source {:?}", unit.source_path);
                }
            }
        }
        units
    }

    /// Enumerates units below `root` according to the configured mode.
    pub fn discover(&self, root: &Path) -> Vec<ConversionUnit> {
        if !root.is_dir() {
            warn!("Input root {:?} is not a directory, skipping", root);
            return Vec::new();
        }

        let units = match self.config.mode {
            DiscoveryMode::Descriptor => self.find_descriptors(root),
            DiscoveryMode::DirectMedia => self.find_media(root),
            DiscoveryMode::Auto => {
                let descriptors = self.find_descriptors(root);
                if descriptors.is_empty() {
                    self.find_media(root)
                } else {
                    descriptors
                }
            }
        };

        debug!("Discovered {} units under {:?}", units.len(), root);
        units
    }

    /// Walks `root`, keeping files accepted by `keep` and pruning hidden directories.
    fn walk_files<F>(&self, root: &Path, keep: F) -> Vec<PathBuf>
    where
        F: Fn(&DirEntry) -> bool,
    {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(self.config.max_walk_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_type().is_dir() || !is_hidden(e.file_name()));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && keep(&entry) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    // Unreadable subtrees are skipped, the walk continues.
                    warn!("Error accessing entry under {:?}: {}", root, e);
                }
            }
        }
        files
    }

    /// Every descriptor file below `root`, one unit each.
    pub fn find_descriptors(&self, root: &Path) -> Vec<ConversionUnit> {
        let descriptor = OsStr::new(&self.config.descriptor_file);
        self.walk_files(root, |e| e.file_name() == descriptor)
            .into_iter()
            .map(ConversionUnit::descriptor)
            .collect()
    }

    /// Every media container below `root`, one unit each.
    pub fn find_media(&self, root: &Path) -> Vec<ConversionUnit> {
        self.walk_files(root, |e| has_extension(e.path(), &self.config.media_extensions))
            .into_iter()
            .map(ConversionUnit::direct_media)
            .collect()
    }

    /// Resolves the title and the encoder input of a unit.
    pub fn resolve(&self, unit: &ConversionUnit) -> Result<ResolvedUnit, DiscoveryError> {
        match unit.kind {
            UnitKind::DescriptorBased => {
                let display_name = self.descriptor_title(&unit.source_path)?;
                let dir = unit.source_dir();
                let audio_path =
                    self.find_audio(dir)
                        .ok_or_else(|| DiscoveryError::AudioNotFound {
                            searched: dir.to_path_buf(),
                        })?;
                Ok(ResolvedUnit {
                    display_name,
                    audio_path,
                })
            }
            UnitKind::DirectMedia => Ok(ResolvedUnit {
                display_name: unit
                    .source_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default(),
                audio_path: unit.source_path.clone(),
            }),
        }
    }

    /// Memoized title lookup for a descriptor file.
    pub fn descriptor_title(&self, descriptor: &Path) -> Result<String, DiscoveryError> {
        if let Some(cached) = lock(&self.title_cache).get(descriptor) {
            return cached.clone();
        }

        let title = self.read_title(descriptor);
        lock(&self.title_cache)
            .entry(descriptor.to_path_buf())
            .or_insert(title)
            .clone()
    }

    fn read_title(&self, descriptor: &Path) -> Result<String, DiscoveryError> {
        let contents = std::fs::read_to_string(descriptor).map_err(|e| {
            DiscoveryError::DescriptorUnreadable {
                path: descriptor.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let value: serde_json::Value =
            serde_json::from_str(&contents).map_err(|e| DiscoveryError::DescriptorMalformed {
                path: descriptor.to_path_buf(),
                reason: e.to_string(),
            })?;

        let object = value
            .as_object()
            .ok_or_else(|| DiscoveryError::DescriptorMalformed {
                path: descriptor.to_path_buf(),
                reason: "top-level value is not an object".to_string(),
            })?;

        object
            .get(&self.config.title_field)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DiscoveryError::MissingTitle {
                path: descriptor.to_path_buf(),
                field: self.config.title_field.clone(),
            })
    }

    /// Memoized audio lookup for a descriptor directory.
    pub fn find_audio(&self, dir: &Path) -> Option<PathBuf> {
        if let Some(cached) = lock(&self.audio_cache).get(dir) {
            return cached.clone();
        }

        let found = self.search_audio(dir);
        match &found {
            Some(path) => debug!("Resolved audio for {:?}: {:?}", dir, path),
            None => debug!("No audio stream under {:?}", dir),
        }
        lock(&self.audio_cache)
            .entry(dir.to_path_buf())
            .or_insert(found)
            .clone()
    }

    fn search_audio(&self, dir: &Path) -> Option<PathBuf> {
        for name in &self.config.audio_file_names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        let vocabulary = &self.config.audio_dir_names;
        let walker = WalkDir::new(dir)
            .follow_links(false)
            .min_depth(1)
            .max_depth(self.config.audio_search_depth + 1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name();
                !is_hidden(name) || name.to_str().is_some_and(|n| matches_any(n, vocabulary))
            });

        // Lowest key wins: an "audio.*" stem first, then a vocabulary folder,
        // then the shallowest file in walk order.
        walker
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| has_extension(e.path(), &self.config.audio_extensions))
            .enumerate()
            .min_by_key(|(order, e)| {
                let path = e.path();
                let audio_stem = path
                    .file_stem()
                    .and_then(OsStr::to_str)
                    .is_some_and(|s| s.eq_ignore_ascii_case(AUDIO_STEM));
                let in_audio_dir = path
                    .strip_prefix(dir)
                    .ok()
                    .and_then(Path::parent)
                    .is_some_and(|rel| {
                        rel.components().any(|c| {
                            c.as_os_str()
                                .to_str()
                                .is_some_and(|n| matches_any(n, vocabulary))
                        })
                    });
                (!audio_stem, !in_audio_dir, e.depth(), *order)
            })
            .map(|(_, e)| e.into_path())
    }
}
