use std::io::Read;
use std::path::{Path, PathBuf};

use kindctl::context::{find_repo_root, RepoContext};

pub type CmdResult<T> = kindctl::Result<(T, i32)>;

/// Environment variable that pins the repository root.
pub const REPO_ROOT_ENV: &str = "REPO_ROOT";

pub(crate) struct GlobalArgs {
    pub repo_root: Option<String>,
}

/// Resolve the repository root and load its layout.
///
/// Order: `--repo-root`, `$REPO_ROOT`, nearest ancestor of the working
/// directory holding `.git` or `go.mod`, the working directory itself.
pub(crate) fn repo_context(global: &GlobalArgs) -> kindctl::Result<RepoContext> {
    let explicit = global
        .repo_root
        .clone()
        .or_else(|| std::env::var(REPO_ROOT_ENV).ok())
        .filter(|root| !root.trim().is_empty());

    let root = match explicit {
        Some(root) => PathBuf::from(shellexpand::tilde(root.trim()).to_string()),
        None => {
            let cwd = std::env::current_dir().map_err(|e| {
                kindctl::Error::internal_io(
                    e.to_string(),
                    Some("read working directory".to_string()),
                )
            })?;
            find_repo_root(&cwd)
        }
    };

    RepoContext::load(root)
}

/// Read content from stdin or a file; exactly one source is allowed.
///
/// `file_flag` names the file option in error messages (`--content-file`).
pub(crate) fn read_content(
    stdin: bool,
    file: Option<&str>,
    file_flag: &str,
) -> kindctl::Result<String> {
    match (stdin, file) {
        (true, None) => read_stdin(),
        (false, Some(path)) => read_content_file(path),
        (true, Some(_)) => Err(kindctl::Error::validation_invalid_argument(
            "content",
            format!("Use either --stdin or {}, not both", file_flag),
            None,
        )),
        (false, None) => Err(kindctl::Error::validation_missing_argument(vec![
            "--stdin".to_string(),
            file_flag.to_string(),
        ])),
    }
}

fn read_stdin() -> kindctl::Result<String> {
    if crate::tty::is_stdin_tty() {
        return Err(kindctl::Error::validation_invalid_argument(
            "stdin",
            "Cannot read content from stdin when stdin is a TTY",
            None,
        ));
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| kindctl::Error::internal_io(e.to_string(), Some("read stdin".to_string())))?;
    Ok(buf)
}

pub(crate) fn read_content_file(path: &str) -> kindctl::Result<String> {
    let expanded = shellexpand::tilde(path).to_string();
    kindctl::io::read_file(Path::new(&expanded), &format!("read {}", path))
}

pub mod registry;
pub mod rename;
pub mod variants;
pub mod write;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (kindctl::Result<serde_json::Value>, i32) {
    crate::tty::status("kindctl is working...");

    match command {
        // Commands without repository context
        crate::Commands::Variants(args) => dispatch!(args, variants),

        // Commands with repository context
        crate::Commands::Rename(args) => dispatch!(args, global, rename),
        crate::Commands::Registry(args) => dispatch!(args, global, registry),
        crate::Commands::Write(args) => dispatch!(args, global, write),
    }
}
