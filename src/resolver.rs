//! Recursive asset lookup over the server's folder view.
//!
//! The resolver walks the remote folder tree breadth-first from a starting
//! path, one request per folder, and merges every asset it sees into a
//! single [`AssetIdSet`]. Each path is queried at most once, so a server
//! that reports a folder as its own child cannot make the walk loop.

use std::collections::{HashSet, VecDeque};
use std::path::Path;

use crate::api::{FolderListing, ImmichApi};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::AssetIdSet;
use crate::path::{to_relative_path, RelativePath};

/// A subfolder whose listing could not be fetched.
#[derive(Debug)]
pub struct SubpathFailure {
    pub path: RelativePath,
    pub error: Error,
}

/// Everything found under one starting path.
#[derive(Debug)]
pub struct Resolution {
    pub path: RelativePath,
    pub assets: AssetIdSet,
    /// Number of folders successfully listed, the starting one included.
    pub folders_visited: usize,
    pub failures: Vec<SubpathFailure>,
    root_empty: bool,
}

impl Resolution {
    /// The starting folder held neither assets nor subfolders. Usually
    /// means the path does not exist on the server.
    pub fn is_empty_path(&self) -> bool {
        self.root_empty
    }

    /// Some subfolders could not be listed; `assets` is incomplete.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failed_paths(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.path.to_string()).collect()
    }

    /// Fail with `EmptyPathResult` when nothing was found at the start.
    pub fn require_assets(self) -> Result<Self> {
        if self.root_empty {
            return Err(Error::EmptyPathResult {
                path: self.path.to_string(),
            });
        }
        Ok(self)
    }

    /// Fail with `PartialResolution` if any subfolder failed.
    pub fn strict(self) -> Result<Self> {
        if self.is_partial() {
            return Err(Error::PartialResolution {
                failed: self.failed_paths(),
            });
        }
        Ok(self)
    }
}

pub struct AssetResolver<'a, A: ImmichApi + ?Sized> {
    config: &'a Config,
    api: &'a A,
}

impl<'a, A: ImmichApi + ?Sized> AssetResolver<'a, A> {
    pub fn new(config: &'a Config, api: &'a A) -> Self {
        Self { config, api }
    }

    /// Resolve a local path under the library root. A path naming an
    /// existing file resolves its parent folder.
    pub fn resolve_local(&self, local_path: &Path) -> Result<Resolution> {
        let root = &self.config.library_root;
        let mut relative = to_relative_path(root, local_path)?;
        if local_path.is_file() {
            if let Some(parent) = local_path.parent() {
                relative = to_relative_path(root, parent)?;
            }
        }
        self.resolve_assets(&relative)
    }

    /// Collect every asset in `path` and all folders below it.
    ///
    /// A failure listing `path` itself is returned as an error. Failures
    /// below it are recorded in [`Resolution::failures`] and the walk
    /// carries on, except for authentication errors, which abort.
    pub fn resolve_assets(&self, path: &RelativePath) -> Result<Resolution> {
        let listing = self.api.folder(path)?;
        let root_empty = listing.is_empty();

        let mut walk = Walk::new(path.clone());
        walk.absorb(path, listing);

        while let Some(next) = walk.pending.pop_front() {
            match self.api.folder(&next) {
                Ok(listing) => walk.absorb(&next, listing),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(path = %next, error = %e, "failed to list folder");
                    walk.failures.push(SubpathFailure {
                        path: next,
                        error: e,
                    });
                }
            }
        }

        tracing::debug!(
            path = %path,
            assets = walk.assets.len(),
            folders = walk.visited_ok,
            failed = walk.failures.len(),
            "resolved folder tree"
        );

        Ok(Resolution {
            path: path.clone(),
            assets: walk.assets,
            folders_visited: walk.visited_ok,
            failures: walk.failures,
            root_empty,
        })
    }
}

struct Walk {
    pending: VecDeque<RelativePath>,
    seen: HashSet<RelativePath>,
    assets: AssetIdSet,
    failures: Vec<SubpathFailure>,
    visited_ok: usize,
}

impl Walk {
    fn new(start: RelativePath) -> Self {
        let mut seen = HashSet::new();
        seen.insert(start);
        Walk {
            pending: VecDeque::new(),
            seen,
            assets: AssetIdSet::new(),
            failures: Vec::new(),
            visited_ok: 0,
        }
    }

    fn absorb(&mut self, parent: &RelativePath, listing: FolderListing) {
        self.visited_ok += 1;
        self.assets.extend(listing.assets);
        for name in listing.folders {
            if !is_valid_child(&name) {
                tracing::warn!(parent = %parent, name = %name, "skipping malformed folder name");
                continue;
            }
            let child = parent.join(&name);
            if self.seen.insert(child.clone()) {
                self.pending.push_back(child);
            } else {
                tracing::debug!(path = %child, "folder already visited");
            }
        }
    }
}

fn is_valid_child(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}
