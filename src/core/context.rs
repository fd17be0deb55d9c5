//! Repository context: the root directory plus its layout conventions.
//!
//! Everything that touches the monorepo takes a `&RepoContext` instead of
//! reading the working directory or environment on its own.

use std::path::{Path, PathBuf};

use crate::config::{self, RepoLayout};
use crate::error::{Error, Result};

/// Marker entries that identify a repository root.
const ROOT_MARKERS: &[(&str, bool)] = &[(".git", true), ("go.mod", false)];

#[derive(Debug, Clone)]
pub struct RepoContext {
    pub root: PathBuf,
    pub layout: RepoLayout,
}

impl RepoContext {
    /// Context for `root` with its `.kindctl.json` layout (or defaults).
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::validation_invalid_argument(
                "repo_root",
                format!("Repository root is not a directory: {}", root.display()),
                Some(root.display().to_string()),
            ));
        }
        let layout = config::load_layout(&root)?;
        Ok(Self { root, layout })
    }

    pub fn with_layout(root: impl Into<PathBuf>, layout: RepoLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.layout.registry_path)
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root.join(&self.layout.docs_dir)
    }

    pub fn apis_dir(&self) -> PathBuf {
        self.root.join(&self.layout.apis_dir)
    }

    /// `<provider_root>/<provider>` where `provider` may contain a group segment.
    pub fn provider_dir(&self, provider: &str) -> PathBuf {
        self.root.join(&self.layout.provider_root).join(provider)
    }

    pub fn component_dir(&self, provider: &str, folder: &str) -> PathBuf {
        self.provider_dir(provider).join(folder)
    }

    /// Resolve where a component folder lives for a registry provider.
    ///
    /// Grouped providers (e.g. `kubernetes`) are checked group by group and the
    /// first group containing `folder` wins, yielding `kubernetes/workload`.
    /// Otherwise the bare provider is returned, whether or not the folder exists.
    pub fn resolve_provider_path(&self, provider: &str, folder: &str) -> String {
        if let Some(groups) = self.layout.provider_groups.get(provider) {
            for group in groups {
                let qualified = format!("{}/{}", provider, group);
                if self.component_dir(&qualified, folder).exists() {
                    return qualified;
                }
            }
        }
        provider.to_string()
    }

    /// Icon folder, keyed by the leading provider segment only.
    pub fn icon_dir(&self, provider: &str, folder: &str) -> PathBuf {
        let leading = provider.split('/').next().unwrap_or(provider);
        self.root
            .join(&self.layout.icon_root)
            .join(leading)
            .join(folder)
    }

    /// `<provider_root>/<provider>/<kind>/<version>` holding generated artifacts.
    pub fn artifact_dir(&self, provider: &str, kind_folder: &str) -> PathBuf {
        self.component_dir(provider, kind_folder)
            .join(&self.layout.artifact_version)
    }

    /// Path relative to the repository root, for display.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Nearest ancestor of `start` (inclusive) that contains a `.git` directory or
/// a `go.mod` file. Falls back to `start` itself.
pub fn find_repo_root(start: &Path) -> PathBuf {
    let mut current = Some(start);

    while let Some(dir) = current {
        let is_root = ROOT_MARKERS.iter().any(|(marker, is_dir)| {
            let candidate = dir.join(marker);
            if *is_dir {
                candidate.is_dir()
            } else {
                candidate.is_file()
            }
        });
        if is_root {
            return dir.to_path_buf();
        }
        current = dir.parent();
    }

    start.to_path_buf()
}
