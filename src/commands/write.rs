use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use kindctl::artifact::{self, ArtifactReport, ModuleManifest, ModuleTarget};

use super::CmdResult;
use crate::output::EXTERNAL_COMMAND_FAILED;

#[derive(Args)]
pub struct WriteArgs {
    #[command(subcommand)]
    command: WriteCommand,
}

#[derive(Args)]
struct TargetArgs {
    /// Provider key (e.g. aws, gcp, kubernetes)
    #[arg(long)]
    provider: String,

    /// Kind folder name, lowercase without underscores (e.g. awscloudfront)
    #[arg(long)]
    kind_folder: String,
}

#[derive(Args)]
struct ContentArgs {
    /// Read content from stdin
    #[arg(long, conflicts_with = "content_file")]
    stdin: bool,

    /// Read content from a file
    #[arg(long, value_name = "PATH")]
    content_file: Option<String>,
}

#[derive(Args)]
struct ManifestArgs {
    /// Read the manifest JSON from stdin
    #[arg(long, conflicts_with = "manifest_file")]
    stdin: bool,

    /// Read the manifest JSON from a file
    #[arg(long, value_name = "PATH")]
    manifest_file: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModuleTargetArg {
    /// iac/tf
    Tf,
    /// iac/pulumi (entrypoint and its docs)
    Pulumi,
    /// iac/pulumi/module
    PulumiModule,
}

impl From<ModuleTargetArg> for ModuleTarget {
    fn from(arg: ModuleTargetArg) -> Self {
        match arg {
            ModuleTargetArg::Tf => ModuleTarget::Tf,
            ModuleTargetArg::Pulumi => ModuleTarget::Pulumi,
            ModuleTargetArg::PulumiModule => ModuleTarget::PulumiModule,
        }
    }
}

#[derive(Subcommand)]
enum WriteCommand {
    /// Write spec.proto and rebuild the API tree
    SpecProto {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Write spec_test.go and run its package tests
    SpecTests {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Write README.md and examples.md
    Docs {
        #[command(flatten)]
        target: TargetArgs,
        /// File holding README.md content
        #[arg(long, value_name = "PATH")]
        readme_file: String,
        /// File holding examples.md content
        #[arg(long, value_name = "PATH")]
        examples_file: String,
    },
    /// Write the files of a JSON manifest into an IaC directory
    Module {
        #[command(flatten)]
        target: TargetArgs,
        /// IaC directory to write into
        #[arg(long = "target", value_enum)]
        module_target: ModuleTargetArg,
        #[command(flatten)]
        manifest: ManifestArgs,
        /// Run `go build` on the written package (Pulumi targets only)
        #[arg(long)]
        build: bool,
    },
}

#[derive(Serialize)]
pub struct WriteOutput {
    pub command: &'static str,
    #[serde(flatten)]
    pub report: ArtifactReport,
}

pub fn run(args: WriteArgs, global: &crate::commands::GlobalArgs) -> CmdResult<WriteOutput> {
    let (command, report) = match args.command {
        WriteCommand::SpecProto { target, content } => {
            let content = read_artifact_content(&content)?;
            let ctx = super::repo_context(global)?;
            (
                "write.spec_proto",
                artifact::write_spec_proto(&ctx, &target.provider, &target.kind_folder, &content)?,
            )
        }
        WriteCommand::SpecTests { target, content } => {
            let content = read_artifact_content(&content)?;
            let ctx = super::repo_context(global)?;
            (
                "write.spec_tests",
                artifact::write_spec_tests(&ctx, &target.provider, &target.kind_folder, &content)?,
            )
        }
        WriteCommand::Docs {
            target,
            readme_file,
            examples_file,
        } => {
            let readme = super::read_content_file(&readme_file)?;
            let examples = super::read_content_file(&examples_file)?;
            let ctx = super::repo_context(global)?;
            let report = artifact::write_docs(
                &ctx,
                &target.provider,
                &target.kind_folder,
                &readme,
                &examples,
            )?;
            ("write.docs", report)
        }
        WriteCommand::Module {
            target,
            module_target,
            manifest,
            build,
        } => {
            let raw = super::read_content(
                manifest.stdin,
                manifest.manifest_file.as_deref(),
                "--manifest-file",
            )?;
            let manifest = ModuleManifest::parse(&raw)?;
            let ctx = super::repo_context(global)?;
            let report = artifact::write_module(
                &ctx,
                &target.provider,
                &target.kind_folder,
                module_target.into(),
                &manifest,
                build,
            )?;
            ("write.module", report)
        }
    };

    let exit_code = if report.success {
        0
    } else {
        EXTERNAL_COMMAND_FAILED
    };

    Ok((WriteOutput { command, report }, exit_code))
}

fn read_artifact_content(args: &ContentArgs) -> kindctl::Result<String> {
    super::read_content(args.stdin, args.content_file.as_deref(), "--content-file")
}
