//! Component rename pipeline.
//!
//! ```text
//! validate old exists -> validate new absent -> update registry
//!   -> rename icon folder -> rename component tree -> move component root
//!   -> rename docs tree -> build (protos, build, test)
//! ```
//!
//! [`validate`] touches nothing on disk. [`execute`] mutates; once the
//! registry is rewritten every later failure lands in the report instead of
//! an `Err`. There is no rollback: a half-applied rename is undone by
//! renaming back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::build::{self, BuildResults};
use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::refactor::{apply_rules, case, variant_pairs, RenameStats};
use crate::registry::{self, RegistryEntry};
use crate::utils::validation;

#[derive(Debug, Clone, Default)]
pub struct RenameRequest {
    pub old_name: String,
    pub new_name: String,
    /// Replaces the entry's existing `id_prefix` when set.
    pub new_id_prefix: Option<String>,
    pub skip_build: bool,
}

impl RenameRequest {
    /// Equivalent `kindctl rename` invocation.
    pub fn command_line(&self) -> String {
        let mut line = format!(
            "kindctl rename --old-name {} --new-name {}",
            self.old_name, self.new_name
        );
        if let Some(prefix) = &self.new_id_prefix {
            line.push_str(&format!(" --new-id-prefix {}", prefix));
        }
        if self.skip_build {
            line.push_str(" --skip-build");
        }
        line
    }
}

/// A rename whose preconditions all hold. Produced by [`validate`].
#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub old_name: String,
    pub new_name: String,
    pub old_folder: String,
    pub new_folder: String,
    pub new_id_prefix: Option<String>,
    pub entry: RegistryEntry,
    pub provider_path: String,
    pub old_dir: PathBuf,
    pub new_dir: PathBuf,
    pub skip_build: bool,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IconResult {
    pub exists: bool,
    pub old_path: String,
    pub new_path: String,
    pub renamed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameReport {
    pub success: bool,
    pub old_component: String,
    pub new_component: String,
    pub old_folder: String,
    pub new_folder: String,
    pub old_id_prefix: Option<String>,
    pub new_id_prefix: Option<String>,
    pub enum_value: String,
    /// Provider as declared in the registry.
    pub provider: String,
    /// Provider directory actually used, including any group (`kubernetes/workload`).
    pub provider_path: String,
    pub component_dir: String,
    #[serde(flatten)]
    pub stats: RenameStats,
    pub icon: IconResult,
    pub build: BuildResults,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// How to get back to a consistent repository after a partial rename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl RenameReport {
    /// Request that undoes this rename.
    pub fn reverse_request(&self) -> RenameRequest {
        RenameRequest {
            old_name: self.new_component.clone(),
            new_name: self.old_component.clone(),
            new_id_prefix: self.old_id_prefix.clone(),
            skip_build: true,
        }
    }

    /// Whether the failure came from the external build tool.
    pub fn build_failed(&self) -> bool {
        self.build.failed_target().is_some()
    }
}

/// Rename a component across the registry, its directory tree, its icon
/// folder and the shared docs, then run the build.
///
/// Returns `Err` only for failures before the first filesystem mutation.
/// Later failures, including a failing build, return `Ok` with
/// `success: false`.
pub fn rename(ctx: &RepoContext, req: &RenameRequest) -> Result<RenameReport> {
    let plan = validate(ctx, req)?;
    execute(ctx, plan)
}

/// Check every precondition of `req` without touching the repository.
pub fn validate(ctx: &RepoContext, req: &RenameRequest) -> Result<RenamePlan> {
    let started_at = Utc::now();

    let old_name = validation::require_identifier(&req.old_name, "old_name")?;
    let new_name = validation::require_identifier(&req.new_name, "new_name")?;
    if old_name == new_name {
        return Err(Error::validation_invalid_argument(
            "new_name",
            "New component name must differ from the old one",
            Some(new_name.to_string()),
        ));
    }
    let new_id_prefix = req
        .new_id_prefix
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let old_folder = case::lowercase(old_name);
    let new_folder = case::lowercase(new_name);
    let registry_path = ctx.registry_path();
    let registry_display = ctx.relative(&registry_path);

    // Validate old exists
    let entry = registry::locate(&registry_path, old_name)?
        .ok_or_else(|| Error::registry_entry_not_found(old_name, &registry_display))?;

    let provider_path = ctx.resolve_provider_path(&entry.provider, &old_folder);
    let old_dir = ctx.component_dir(&provider_path, &old_folder);
    if !old_dir.is_dir() {
        return Err(Error::component_directory_not_found(
            old_name,
            old_dir.display().to_string(),
        ));
    }

    // Validate new absent
    if registry::locate(&registry_path, new_name)?.is_some() {
        return Err(Error::registry_entry_exists(new_name, &registry_display));
    }
    let new_dir = ctx.component_dir(&provider_path, &new_folder);
    if new_folder != old_folder && new_dir.exists() {
        return Err(Error::component_directory_exists(
            new_name,
            new_dir.display().to_string(),
        ));
    }

    Ok(RenamePlan {
        old_name: old_name.to_string(),
        new_name: new_name.to_string(),
        old_folder,
        new_folder,
        new_id_prefix,
        entry,
        provider_path,
        old_dir,
        new_dir,
        skip_build: req.skip_build,
        started_at,
    })
}

/// Apply a validated rename.
///
/// Only a registry rewrite failure returns `Err`; nothing else has been
/// touched at that point.
pub fn execute(ctx: &RepoContext, plan: RenamePlan) -> Result<RenameReport> {
    let registry_path = ctx.registry_path();
    let registry_display = ctx.relative(&registry_path);

    log_status!(
        "rename",
        "{} -> {} ({})",
        plan.old_name,
        plan.new_name,
        plan.provider_path
    );

    registry::update(
        &registry_path,
        &plan.old_name,
        &plan.new_name,
        plan.new_id_prefix.as_deref(),
    )?;
    log_status!("rename", "Updated registry entry in {}", registry_display);

    let mut stats = RenameStats::default();
    let icon = rename_icon_folder(
        ctx,
        &plan.provider_path,
        &plan.old_folder,
        &plan.new_folder,
        &mut stats,
    );

    let rules = variant_pairs(&plan.old_name, &plan.new_name);
    apply_rules(&plan.old_dir, &rules, &mut stats);

    let mut report = RenameReport {
        success: false,
        old_component: plan.old_name.clone(),
        new_component: plan.new_name.clone(),
        old_folder: plan.old_folder.clone(),
        new_folder: plan.new_folder.clone(),
        old_id_prefix: plan.entry.id_prefix.clone(),
        new_id_prefix: plan.new_id_prefix.clone(),
        enum_value: plan.entry.enum_value.clone(),
        provider: plan.entry.provider.clone(),
        provider_path: plan.provider_path.clone(),
        component_dir: ctx.relative(&plan.new_dir),
        stats: RenameStats::default(),
        icon,
        build: build::skipped(&ctx.layout.build),
        started_at: plan.started_at,
        duration_seconds: 0.0,
        error: None,
        hint: None,
    };

    if plan.new_folder != plan.old_folder {
        if let Err(e) = fs::rename(&plan.old_dir, &plan.new_dir) {
            eprintln!(
                "[rename] Error moving {} to {}: {}",
                plan.old_dir.display(),
                plan.new_dir.display(),
                e
            );
            stats.errors += 1;
            report.component_dir = ctx.relative(&plan.old_dir);
            report.error = Some(format!(
                "Failed to move component directory {} to {}: {}",
                ctx.relative(&plan.old_dir),
                ctx.relative(&plan.new_dir),
                e
            ));
            report.hint = Some(format!(
                "Move {} to {} by hand, then run '{}' to revert",
                plan.old_dir.display(),
                plan.new_dir.display(),
                report.reverse_request().command_line()
            ));
            return Ok(finish(report, stats));
        }
        stats.dirs_renamed += 1;
    }
    log_status!(
        "rename",
        "Component tree: {} dirs, {} files renamed, {} files updated",
        stats.dirs_renamed,
        stats.files_renamed,
        stats.files_updated
    );

    let docs_dir = ctx.docs_dir();
    if docs_dir.is_dir() {
        apply_rules(&docs_dir, &rules, &mut stats);
    }

    if !plan.skip_build {
        report.build = build::run(ctx);
    }

    match report.build.failed_target() {
        Some(target) => {
            report.error = Some(format!("Build pipeline failed at '{}'", target));
        }
        None => report.success = true,
    }

    Ok(finish(report, stats))
}

fn finish(mut report: RenameReport, stats: RenameStats) -> RenameReport {
    report.stats = stats;
    let elapsed = Utc::now() - report.started_at;
    report.duration_seconds = elapsed.num_milliseconds() as f64 / 1000.0;
    report
}

/// Move the icon folder, replacing an existing target. A missing source is
/// recorded, not an error.
fn rename_icon_folder(
    ctx: &RepoContext,
    provider_path: &str,
    old_folder: &str,
    new_folder: &str,
    stats: &mut RenameStats,
) -> IconResult {
    let old_path = ctx.icon_dir(provider_path, old_folder);
    let new_path = ctx.icon_dir(provider_path, new_folder);

    let mut result = IconResult {
        exists: old_path.exists(),
        old_path: ctx.relative(&old_path),
        new_path: ctx.relative(&new_path),
        renamed: false,
    };

    if !result.exists {
        log_status!("rename", "Icon folder not found (skipped): {}", result.old_path);
        return result;
    }
    if old_path == new_path {
        return result;
    }

    match replace_dir(&old_path, &new_path) {
        Ok(()) => {
            log_status!(
                "rename",
                "Renamed icon folder: {} -> {}",
                result.old_path,
                result.new_path
            );
            result.renamed = true;
        }
        Err(e) => {
            eprintln!("[rename] Error renaming icon folder {}: {}", old_path.display(), e);
            stats.errors += 1;
        }
    }

    result
}

fn replace_dir(from: &Path, to: &Path) -> std::io::Result<()> {
    if to.is_dir() {
        fs::remove_dir_all(to)?;
    } else if to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)
}

/// Component directory the registry entry for `identifier` points at, if both exist.
pub fn component_location(ctx: &RepoContext, entry: &RegistryEntry) -> Option<PathBuf> {
    let folder = case::lowercase(&entry.identifier);
    let provider_path = ctx.resolve_provider_path(&entry.provider, &folder);
    let dir = ctx.component_dir(&provider_path, &folder);
    dir.is_dir().then_some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoLayout;
    use tempfile::TempDir;

    const REGISTRY: &str = "enum CloudResourceKind {\n  FooBar = 5 [(kind_meta) = {provider: aws, id_prefix: \"fb\"}];\n  Existing = 6 [(kind_meta) = {provider: aws}];\n}\n";

    fn fixture() -> (TempDir, RepoContext) {
        let dir = TempDir::new().unwrap();
        let mut layout = RepoLayout::default();
        layout.build.tool = "true".to_string();
        let ctx = RepoContext::with_layout(dir.path(), layout);

        let registry = ctx.registry_path();
        fs::create_dir_all(registry.parent().unwrap()).unwrap();
        fs::write(&registry, REGISTRY).unwrap();

        let component = ctx.component_dir("aws", "foobar");
        fs::create_dir_all(component.join("v1")).unwrap();
        fs::write(component.join("v1/api.proto"), "message FooBar {}\n// foo_bar\n").unwrap();
        (dir, ctx)
    }

    fn request(old: &str, new: &str) -> RenameRequest {
        RenameRequest {
            old_name: old.to_string(),
            new_name: new.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn rename_moves_tree_and_registry() {
        let (_dir, ctx) = fixture();
        let report = rename(&ctx, &request("FooBar", "BazQux")).unwrap();

        assert!(report.success);
        assert_eq!(report.enum_value, "5");
        assert_eq!(report.old_id_prefix.as_deref(), Some("fb"));
        assert_eq!(report.component_dir, "apis/org/project_planton/provider/aws/bazqux");
        let renamed = ctx.component_dir("aws", "bazqux").join("v1/api.proto");
        assert_eq!(
            fs::read_to_string(renamed).unwrap(),
            "message BazQux {}\n// baz_qux\n"
        );
        assert!(!ctx.component_dir("aws", "foobar").exists());
        assert!(report.build.protos.ran);
    }

    #[test]
    fn unknown_old_name_is_not_found() {
        let (_dir, ctx) = fixture();
        let err = rename(&ctx, &request("Missing", "Other")).unwrap_err();
        assert_eq!(err.code.as_str(), "registry.entry_not_found");
    }

    #[test]
    fn registered_new_name_leaves_everything_untouched() {
        let (_dir, ctx) = fixture();
        let err = rename(&ctx, &request("FooBar", "Existing")).unwrap_err();

        assert_eq!(err.code.as_str(), "registry.entry_exists");
        assert_eq!(fs::read_to_string(ctx.registry_path()).unwrap(), REGISTRY);
        assert!(ctx.component_dir("aws", "foobar").join("v1/api.proto").exists());
    }

    #[test]
    fn same_names_are_rejected() {
        let (_dir, ctx) = fixture();
        let err = rename(&ctx, &request("FooBar", "FooBar")).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn failing_build_reports_failure() {
        let (_dir, mut ctx) = fixture();
        ctx.layout.build.tool = "false".to_string();

        let report = rename(&ctx, &request("FooBar", "BazQux")).unwrap();
        assert!(!report.success);
        assert_eq!(report.error.as_deref(), Some("Build pipeline failed at 'protos'"));
        assert!(!report.build.test.ran);
    }

    #[test]
    fn validate_leaves_repository_untouched() {
        let (_dir, ctx) = fixture();
        let plan = validate(&ctx, &request("FooBar", "BazQux")).unwrap();

        assert_eq!(plan.new_folder, "bazqux");
        assert_eq!(plan.entry.enum_value, "5");
        assert_eq!(plan.new_dir, ctx.component_dir("aws", "bazqux"));
        assert_eq!(fs::read_to_string(ctx.registry_path()).unwrap(), REGISTRY);
        assert!(!plan.new_dir.exists());
    }

    #[test]
    fn command_line_includes_optional_flags() {
        let req = RenameRequest {
            old_name: "BazQux".to_string(),
            new_name: "FooBar".to_string(),
            new_id_prefix: Some("fb".to_string()),
            skip_build: true,
        };
        assert_eq!(
            req.command_line(),
            "kindctl rename --old-name BazQux --new-name FooBar --new-id-prefix fb --skip-build"
        );
        assert_eq!(
            request("A", "B").command_line(),
            "kindctl rename --old-name A --new-name B"
        );
    }

    #[test]
    fn reverse_request_swaps_names() {
        let (_dir, ctx) = fixture();
        let mut req = request("FooBar", "BazQux");
        req.new_id_prefix = Some("bq".to_string());
        let report = rename(&ctx, &req).unwrap();

        let back = rename(&ctx, &report.reverse_request()).unwrap();
        assert!(back.success);
        assert_eq!(fs::read_to_string(ctx.registry_path()).unwrap(), REGISTRY);
    }
}
