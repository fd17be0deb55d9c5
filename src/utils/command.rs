//! Command execution primitives with consistent output capture.

use std::path::Path;
use std::process::{Command, Output};

use serde::Serialize;

/// Exit code reported when a program cannot be spawned at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Captured result of one external process run to completion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn from_output(output: Output) -> Self {
        Self {
            // Killed by a signal: no code, report as generic failure.
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Run `program args...` in `dir`, waiting for it to finish.
///
/// Never fails: a program that cannot be spawned yields exit code 127 with
/// the spawn error in `stderr`. No timeout is applied.
pub fn run_captured(
    program: &str,
    args: &[&str],
    dir: &Path,
    env: &[(&str, &str)],
) -> CommandOutput {
    let result = Command::new(program)
        .args(args)
        .current_dir(dir)
        .envs(env.iter().copied())
        .output();

    match result {
        Ok(output) => CommandOutput::from_output(output),
        Err(e) => CommandOutput {
            exit_code: SPAWN_FAILURE_EXIT_CODE,
            stdout: String::new(),
            stderr: format!("failed to execute {}: {}", program, e),
        },
    }
}

/// Render a program and its arguments as a single display string.
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_captured_collects_stdout() {
        let out = run_captured("echo", &["hello"], Path::new("."), &[]);
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn run_captured_reports_non_zero_exit() {
        let out = run_captured("false", &[], Path::new("."), &[]);
        assert!(!out.success());
        assert_eq!(out.exit_code, 1);
    }

    #[test]
    fn run_captured_maps_missing_program_to_127() {
        let out = run_captured("nonexistent_command_xyz", &[], Path::new("."), &[]);
        assert_eq!(out.exit_code, SPAWN_FAILURE_EXIT_CODE);
        assert!(out.stderr.contains("nonexistent_command_xyz"));
    }

    #[test]
    fn run_captured_passes_env() {
        let out = run_captured(
            "sh",
            &["-c", "echo $KINDCTL_VALUE"],
            Path::new("."),
            &[("KINDCTL_VALUE", "42")],
        );
        assert_eq!(out.stdout.trim(), "42");
    }

    #[test]
    fn display_command_joins_args() {
        assert_eq!(display_command("make", &["-C", "apis", "build"]), "make -C apis build");
    }
}
