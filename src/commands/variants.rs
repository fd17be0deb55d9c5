use clap::Args;
use serde::Serialize;

use kindctl::refactor::{variant_pairs, CaseVariant};
use kindctl::validation;

use super::CmdResult;

#[derive(Args)]
pub struct VariantsArgs {
    /// Current component name in PascalCase
    #[arg(long)]
    pub old_name: String,

    /// New component name in PascalCase
    #[arg(long)]
    pub new_name: String,
}

#[derive(Serialize)]
pub struct VariantsOutput {
    pub command: &'static str,
    pub old_name: String,
    pub new_name: String,
    /// Substitution rules in the order they are applied.
    pub variants: Vec<CaseVariant>,
}

pub fn run(args: VariantsArgs) -> CmdResult<VariantsOutput> {
    let old_name = validation::require_identifier(&args.old_name, "old_name")?;
    let new_name = validation::require_identifier(&args.new_name, "new_name")?;

    Ok((
        VariantsOutput {
            command: "variants",
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            variants: variant_pairs(old_name, new_name),
        },
        0,
    ))
}
