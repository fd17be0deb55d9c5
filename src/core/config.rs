use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;

/// Per-repository override file, looked up at the repository root.
pub const CONFIG_FILE_NAME: &str = ".kindctl.json";

/// Monorepo layout conventions, all paths relative to the repository root.
///
/// Every field has a built-in default; `.kindctl.json` only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLayout {
    /// Text file enumerating every component kind.
    #[serde(default = "default_registry_path")]
    pub registry_path: String,

    /// Parent of `<provider>/<kind-folder>/` component directories.
    #[serde(default = "default_provider_root")]
    pub provider_root: String,

    /// Parent of `<provider>/<kind-folder>/` icon folders.
    #[serde(default = "default_icon_root")]
    pub icon_root: String,

    /// Shared documentation tree renamed alongside the component.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// Directory (relative to the root) whose build the proto writer triggers.
    #[serde(default = "default_apis_dir")]
    pub apis_dir: String,

    /// API version directory inside a component folder.
    #[serde(default = "default_artifact_version")]
    pub artifact_version: String,

    #[serde(default = "default_build")]
    pub build: BuildConfig,

    /// Providers whose components live one level deeper, under a group directory.
    #[serde(default = "default_provider_groups")]
    pub provider_groups: BTreeMap<String, Vec<String>>,
}

/// External build tool invoked after a rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_build_tool")]
    pub tool: String,

    /// Targets run in order: schema regeneration, build, tests.
    #[serde(default = "default_protos_target")]
    pub protos_target: String,
    #[serde(default = "default_build_target")]
    pub build_target: String,
    #[serde(default = "default_test_target")]
    pub test_target: String,
}

impl Default for RepoLayout {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
            provider_root: default_provider_root(),
            icon_root: default_icon_root(),
            docs_dir: default_docs_dir(),
            apis_dir: default_apis_dir(),
            artifact_version: default_artifact_version(),
            build: default_build(),
            provider_groups: default_provider_groups(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        default_build()
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_registry_path() -> String {
    "apis/org/project_planton/shared/cloudresourcekind/cloud_resource_kind.proto".to_string()
}

fn default_provider_root() -> String {
    "apis/org/project_planton/provider".to_string()
}

fn default_icon_root() -> String {
    "site/public/images/providers".to_string()
}

fn default_docs_dir() -> String {
    "site/public/docs".to_string()
}

fn default_apis_dir() -> String {
    "apis".to_string()
}

fn default_artifact_version() -> String {
    "v1".to_string()
}

fn default_build() -> BuildConfig {
    BuildConfig {
        tool: default_build_tool(),
        protos_target: default_protos_target(),
        build_target: default_build_target(),
        test_target: default_test_target(),
    }
}

fn default_build_tool() -> String {
    "make".to_string()
}

fn default_protos_target() -> String {
    "protos".to_string()
}

fn default_build_target() -> String {
    "build".to_string()
}

fn default_test_target() -> String {
    "test".to_string()
}

fn default_provider_groups() -> BTreeMap<String, Vec<String>> {
    let mut groups = BTreeMap::new();
    groups.insert(
        "kubernetes".to_string(),
        vec!["workload".to_string(), "addon".to_string()],
    );
    groups
}

// =============================================================================
// Loading
// =============================================================================

/// Load the layout for a repository root.
///
/// A missing `.kindctl.json` yields the built-in defaults; an unreadable or
/// invalid one is an error, so a typo never silently falls back.
pub fn load_layout(repo_root: &Path) -> Result<RepoLayout> {
    let path = repo_root.join(CONFIG_FILE_NAME);

    if !path.is_file() {
        return Ok(RepoLayout::default());
    }

    let content = io::read_file(&path, &format!("read {}", path.display()))?;
    let layout: RepoLayout = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    validate_layout(&layout)?;
    Ok(layout)
}

fn validate_layout(layout: &RepoLayout) -> Result<()> {
    let paths = [
        ("registry_path", &layout.registry_path),
        ("provider_root", &layout.provider_root),
        ("icon_root", &layout.icon_root),
        ("docs_dir", &layout.docs_dir),
        ("apis_dir", &layout.apis_dir),
    ];

    for (key, value) in paths {
        if value.trim().is_empty() || Path::new(value).is_absolute() {
            return Err(Error::config_invalid_value(
                key,
                Some(value.clone()),
                "must be a non-empty path relative to the repository root",
            ));
        }
    }

    if layout.build.tool.trim().is_empty() {
        return Err(Error::config_invalid_value(
            "build.tool",
            None,
            "build tool cannot be empty",
        ));
    }

    Ok(())
}
