//! Component artifact writers.
//!
//! Each writer places content under
//! `<provider_root>/<provider>/<kind-folder>/<version>/`, creating parents as
//! needed, and optionally runs one follow-up command against the result.
//! Content is written verbatim; the follow-up never undoes the write.
//!
//! Module writers take a JSON manifest (`{"files": [{"name", "content"}]}`)
//! and place every file below an IaC subdirectory of the same location.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::utils::command::{display_command, run_captured, CommandOutput};
use crate::utils::{io, validation};

pub const SPEC_PROTO_FILE: &str = "spec.proto";
pub const SPEC_TEST_FILE: &str = "spec_test.go";
pub const README_FILE: &str = "README.md";
pub const EXAMPLES_FILE: &str = "examples.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    SpecProto,
    SpecTests,
    Docs,
    Module,
}

/// IaC location a module manifest is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleTarget {
    /// `iac/tf`
    Tf,
    /// `iac/pulumi` entrypoint (main.go, Pulumi.yaml, Makefile, docs)
    Pulumi,
    /// `iac/pulumi/module`
    PulumiModule,
}

impl ModuleTarget {
    pub fn subdir(self) -> &'static str {
        match self {
            ModuleTarget::Tf => "iac/tf",
            ModuleTarget::Pulumi => "iac/pulumi",
            ModuleTarget::PulumiModule => "iac/pulumi/module",
        }
    }

    /// Go sources that `go build` can check after writing.
    fn is_go(self) -> bool {
        !matches!(self, ModuleTarget::Tf)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleManifest {
    pub files: Vec<ManifestFile>,
}

impl ModuleManifest {
    /// Parse and validate a manifest. Every name must stay inside the module directory.
    pub fn parse(raw: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(raw).map_err(|e| {
            Error::validation_invalid_argument(
                "manifest",
                format!("Failed to parse manifest: {}", e),
                None,
            )
        })?;

        if manifest.files.is_empty() {
            return Err(Error::validation_invalid_argument(
                "manifest.files",
                "Manifest must list at least one file",
                None,
            ));
        }

        let files = manifest
            .files
            .into_iter()
            .enumerate()
            .map(|(i, file)| {
                let name =
                    validation::require_relative_path(&file.name, &format!("files[{}].name", i))?;
                Ok(ManifestFile {
                    name,
                    content: file.content,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { files })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WrittenFile {
    pub path: String,
    pub relative_path: String,
    pub bytes_written: usize,
    pub sha256: String,
}

/// Follow-up command run after the write.
#[derive(Debug, Clone, Serialize)]
pub struct FollowUp {
    pub command: String,
    #[serde(flatten)]
    pub output: CommandOutput,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactReport {
    pub kind: ArtifactKind,
    pub provider: String,
    pub kind_folder: String,
    pub files: Vec<WrittenFile>,
    pub created_dirs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ModuleTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<FollowUp>,
    pub success: bool,
}

/// Validated `(provider, kind_folder)` pair and the directory it maps to.
struct Target {
    provider: String,
    kind_folder: String,
    dir: PathBuf,
}

impl Target {
    fn resolve(ctx: &RepoContext, provider: &str, kind_folder: &str) -> Result<Self> {
        let provider = validation::normalize_segment(provider, "provider")?;
        let kind_folder = validation::normalize_segment(kind_folder, "kind_folder")?;
        let dir = ctx.artifact_dir(&provider, &kind_folder);
        Ok(Self {
            provider,
            kind_folder,
            dir,
        })
    }

    fn report(
        self,
        kind: ArtifactKind,
        files: Vec<WrittenFile>,
        created_dirs: Vec<String>,
        follow_up: Option<FollowUp>,
    ) -> ArtifactReport {
        let success = follow_up.as_ref().map_or(true, |f| f.output.success());
        ArtifactReport {
            kind,
            provider: self.provider,
            kind_folder: self.kind_folder,
            files,
            created_dirs,
            target: None,
            follow_up,
            success,
        }
    }
}

fn write_artifact(ctx: &RepoContext, dir: &Path, name: &str, content: &str) -> Result<WrittenFile> {
    let path = dir.join(name);
    io::write_file(&path, content, &format!("write {}", path.display()))?;
    log_status!("write", "Wrote {}", ctx.relative(&path));

    Ok(WrittenFile {
        path: path.display().to_string(),
        relative_path: ctx.relative(&path),
        bytes_written: content.len(),
        sha256: io::sha256_hex(content.as_bytes()),
    })
}

fn prepare_dir(ctx: &RepoContext, dir: &Path) -> Result<Vec<String>> {
    Ok(io::ensure_dir(dir)?
        .map(|created| vec![ctx.relative(&created)])
        .unwrap_or_default())
}

fn run_follow_up(program: &str, args: &[&str], ctx: &RepoContext) -> FollowUp {
    let root = ctx.root.to_string_lossy().to_string();
    log_status!("write", "Running {}...", display_command(program, args));
    FollowUp {
        command: display_command(program, args),
        output: run_captured(program, args, &ctx.root, &[("REPO_ROOT", root.as_str())]),
    }
}

/// Write `spec.proto` and rebuild the API tree.
pub fn write_spec_proto(
    ctx: &RepoContext,
    provider: &str,
    kind_folder: &str,
    content: &str,
) -> Result<ArtifactReport> {
    let target = Target::resolve(ctx, provider, kind_folder)?;
    let created_dirs = prepare_dir(ctx, &target.dir)?;
    let file = write_artifact(ctx, &target.dir, SPEC_PROTO_FILE, content)?;

    let apis_dir = ctx.apis_dir().to_string_lossy().to_string();
    let build = &ctx.layout.build;
    let follow_up = run_follow_up(
        &build.tool,
        &["-C", apis_dir.as_str(), build.build_target.as_str()],
        ctx,
    );

    Ok(target.report(ArtifactKind::SpecProto, vec![file], created_dirs, Some(follow_up)))
}

/// Write `spec_test.go`, format it, and run the package tests.
pub fn write_spec_tests(
    ctx: &RepoContext,
    provider: &str,
    kind_folder: &str,
    content: &str,
) -> Result<ArtifactReport> {
    let target = Target::resolve(ctx, provider, kind_folder)?;
    let created_dirs = prepare_dir(ctx, &target.dir)?;
    let file = write_artifact(ctx, &target.dir, SPEC_TEST_FILE, content)?;

    let rel_dir = ctx.relative(&target.dir);
    let package = format!("./{}", rel_dir);

    // Formatting is best-effort and never affects the outcome.
    let fmt = run_captured("gofmt", &["-w", file.path.as_str()], &ctx.root, &[]);
    if !fmt.success() {
        let fallback = run_follow_up("go", &["fmt", package.as_str()], ctx);
        if !fallback.output.success() {
            log_status!("write", "Formatting skipped: {}", fallback.output.stderr.trim());
        }
    }

    let packages = format!("{}/...", package);
    let follow_up = run_follow_up("go", &["test", packages.as_str()], ctx);

    Ok(target.report(ArtifactKind::SpecTests, vec![file], created_dirs, Some(follow_up)))
}

/// Write `README.md` and `examples.md`. No follow-up command.
pub fn write_docs(
    ctx: &RepoContext,
    provider: &str,
    kind_folder: &str,
    readme: &str,
    examples: &str,
) -> Result<ArtifactReport> {
    let target = Target::resolve(ctx, provider, kind_folder)?;
    let created_dirs = prepare_dir(ctx, &target.dir)?;
    let files = vec![
        write_artifact(ctx, &target.dir, README_FILE, readme)?,
        write_artifact(ctx, &target.dir, EXAMPLES_FILE, examples)?,
    ];

    Ok(target.report(ArtifactKind::Docs, files, created_dirs, None))
}

/// Write every manifest file below `<kind>/<version>/<target subdir>/`.
///
/// Names are validated up front so a bad entry writes nothing. With `build`,
/// Go targets are compiled with `go build`; terraform targets are never run.
pub fn write_module(
    ctx: &RepoContext,
    provider: &str,
    kind_folder: &str,
    target: ModuleTarget,
    manifest: &ModuleManifest,
    build: bool,
) -> Result<ArtifactReport> {
    if build && !target.is_go() {
        return Err(Error::validation_invalid_argument(
            "build",
            "Only Pulumi targets can be built after writing",
            None,
        ));
    }

    let location = Target::resolve(ctx, provider, kind_folder)?;
    let base = location.dir.join(target.subdir());

    let mut created_dirs = prepare_dir(ctx, &base)?;
    let mut files = Vec::with_capacity(manifest.files.len());
    for entry in &manifest.files {
        let path = base.join(&entry.name);
        if let Some(parent) = path.parent() {
            created_dirs.extend(prepare_dir(ctx, parent)?);
        }
        files.push(write_artifact(ctx, &base, &entry.name, &entry.content)?);
        if entry.name.ends_with(".sh") {
            io::make_executable(&path)?;
        }
    }

    let follow_up = build.then(|| {
        let package = format!("./{}", ctx.relative(&base));
        run_follow_up("go", &["build", package.as_str()], ctx)
    });

    let mut report = location.report(ArtifactKind::Module, files, created_dirs, follow_up);
    report.target = Some(target);
    Ok(report)
}
