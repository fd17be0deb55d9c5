use clap::Args;
use serde::Serialize;

use kindctl::pipeline::{self, RenameReport, RenameRequest};

use super::CmdResult;
use crate::output::EXTERNAL_COMMAND_FAILED;

#[derive(Args)]
pub struct RenameArgs {
    /// Current component name in PascalCase (e.g. KubernetesMicroservice)
    #[arg(long)]
    pub old_name: String,

    /// New component name in PascalCase (e.g. KubernetesDeployment)
    #[arg(long)]
    pub new_name: String,

    /// New id_prefix for the registry entry (keeps the existing one when omitted)
    #[arg(long)]
    pub new_id_prefix: Option<String>,

    /// Skip `protos`, `build` and `test` after renaming
    #[arg(long)]
    pub skip_build: bool,
}

#[derive(Serialize)]
pub struct RenameOutput {
    pub command: &'static str,
    #[serde(flatten)]
    pub report: RenameReport,
}

pub fn run(args: RenameArgs, global: &crate::commands::GlobalArgs) -> CmdResult<RenameOutput> {
    let ctx = super::repo_context(global)?;

    let request = RenameRequest {
        old_name: args.old_name,
        new_name: args.new_name,
        new_id_prefix: args.new_id_prefix,
        skip_build: args.skip_build,
    };

    let report = pipeline::rename(&ctx, &request)?;
    let exit_code = if report.success {
        0
    } else if report.build_failed() {
        EXTERNAL_COMMAND_FAILED
    } else {
        1
    };

    Ok((
        RenameOutput {
            command: "rename",
            report,
        },
        exit_code,
    ))
}
