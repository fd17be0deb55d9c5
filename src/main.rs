use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{registry, rename, variants, write};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "kindctl")]
#[command(version = VERSION)]
#[command(about = "Deterministic tooling for deployment components in a monorepo")]
struct Cli {
    /// Repository root (defaults to $REPO_ROOT, then the nearest ancestor with .git or go.mod)
    #[arg(long, global = true, value_name = "PATH")]
    repo_root: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename a component across the registry, its tree, icons and docs
    Rename(rename::RenameArgs),
    /// Show the case-variant substitutions a rename would apply
    Variants(variants::VariantsArgs),
    /// Inspect the component registry
    Registry(registry::RegistryArgs),
    /// Write component artifacts (spec.proto, spec_test.go, docs, IaC module files)
    Write(write::WriteArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs {
        repo_root: cli.repo_root,
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
