use clap::{Args, Subcommand};
use serde::Serialize;

use kindctl::pipeline;
use kindctl::registry::{self, RegistryEntry};
use kindctl::{Error, RepoContext};

use super::CmdResult;

#[derive(Args)]
pub struct RegistryArgs {
    #[command(subcommand)]
    command: RegistryCommand,
}

#[derive(Subcommand)]
enum RegistryCommand {
    /// Show one registered component
    Show {
        /// Component name in PascalCase
        identifier: String,
    },
    /// List every registered component in file order
    List,
}

#[derive(Serialize)]
pub struct EntrySummary {
    #[serde(flatten)]
    pub entry: RegistryEntry,
    /// Component directory relative to the repository root, when it exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_dir: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum RegistryOutput {
    #[serde(rename = "registry.show")]
    Show {
        registry_path: String,
        #[serde(flatten)]
        entry: EntrySummary,
    },
    #[serde(rename = "registry.list")]
    List {
        registry_path: String,
        count: usize,
        entries: Vec<EntrySummary>,
    },
}

fn summarize(ctx: &RepoContext, entry: RegistryEntry) -> EntrySummary {
    let component_dir = pipeline::component_location(ctx, &entry).map(|dir| ctx.relative(&dir));
    EntrySummary {
        entry,
        component_dir,
    }
}

pub fn run(args: RegistryArgs, global: &crate::commands::GlobalArgs) -> CmdResult<RegistryOutput> {
    let ctx = super::repo_context(global)?;
    let path = ctx.registry_path();
    let registry_path = ctx.relative(&path);

    match args.command {
        RegistryCommand::Show { identifier } => {
            let entry = registry::locate(&path, &identifier)?
                .ok_or_else(|| Error::registry_entry_not_found(&identifier, &registry_path))?;
            Ok((
                RegistryOutput::Show {
                    registry_path,
                    entry: summarize(&ctx, entry),
                },
                0,
            ))
        }
        RegistryCommand::List => {
            let entries: Vec<EntrySummary> = registry::list(&path)?
                .into_iter()
                .map(|entry| summarize(&ctx, entry))
                .collect();
            Ok((
                RegistryOutput::List {
                    registry_path,
                    count: entries.len(),
                    entries,
                },
                0,
            ))
        }
    }
}
