// Path translation between the local library tree and the server's
// folder index. Everything here is pure except `expand_home`, which
// only reads the home directory location.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// A `/`-separated path relative to the library root, in the form the
/// server uses for its folder view. The empty path is the whole library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RelativePath(String);

impl RelativePath {
    pub fn root() -> Self {
        RelativePath(String::new())
    }

    /// Build from a server-style string; surrounding slashes are dropped.
    pub fn new(path: impl AsRef<str>) -> Self {
        RelativePath(path.as_ref().trim_matches('/').to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of a direct child folder.
    pub fn join(&self, child: &str) -> RelativePath {
        if self.is_root() {
            RelativePath(child.to_string())
        } else {
            RelativePath(format!("{}/{}", self.0, child))
        }
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Map `local_path` to its library-relative form.
///
/// Both paths are normalised lexically (`.` dropped, `..` folded) before
/// comparing, and the comparison is per component, so `/photos2` is not
/// considered to be inside `/photos`.
pub fn to_relative_path(library_root: &Path, local_path: &Path) -> Result<RelativePath> {
    if !library_root.is_absolute() {
        return Err(Error::InvalidConfig(format!(
            "library root {library_root:?} is not an absolute path"
        )));
    }
    let outside = || Error::PathOutsideRoot {
        path: local_path.to_path_buf(),
        root: library_root.to_path_buf(),
    };
    if !local_path.is_absolute() {
        return Err(outside());
    }

    let root = normalize(library_root);
    let local = normalize(local_path);
    let rest = local.strip_prefix(&root).map_err(|_| outside())?;

    let mut parts = Vec::new();
    for component in rest.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| Error::InvalidPath {
                path: local_path.to_path_buf(),
            })?;
            parts.push(part);
        }
    }
    Ok(RelativePath(parts.join("/")))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(input: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (input, home) {
        ("~", Some(home)) => home,
        (s, Some(home)) if s.starts_with("~/") => home.join(&s[2..]),
        (s, _) => PathBuf::from(s),
    }
}

/// Resolve user input for a path under the library root. Absolute input
/// (after `~` expansion) is taken as-is, anything else is joined onto
/// `library_root`.
pub fn join_under_root(library_root: &Path, input: &str) -> PathBuf {
    let input = input.trim();
    let expanded = expand_home(input);
    if expanded.is_absolute() {
        expanded
    } else {
        library_root.join(expanded)
    }
}
