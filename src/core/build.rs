//! Post-rename validation: regenerate schemas, build, test.
//!
//! Targets run strictly in order from the repository root and stop at the
//! first failure. Steps that never ran are still reported, flagged `ran: false`.

use serde::Serialize;

use crate::config::BuildConfig;
use crate::context::RepoContext;
use crate::utils::command::{display_command, run_captured, CommandOutput};

#[derive(Debug, Clone, Serialize)]
pub struct BuildStep {
    pub target: String,
    pub command: String,
    pub ran: bool,
    #[serde(flatten)]
    pub output: CommandOutput,
}

impl BuildStep {
    fn skipped(tool: &str, target: &str) -> Self {
        Self {
            target: target.to_string(),
            command: display_command(tool, &[target]),
            ran: false,
            output: CommandOutput::default(),
        }
    }

    pub fn success(&self) -> bool {
        self.output.success()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildResults {
    pub protos: BuildStep,
    pub build: BuildStep,
    pub test: BuildStep,
    pub skipped: bool,
}

impl BuildResults {
    /// All three targets ran and exited zero.
    pub fn success(&self) -> bool {
        self.steps()
            .iter()
            .all(|step| step.ran && step.success())
    }

    pub fn steps(&self) -> [&BuildStep; 3] {
        [&self.protos, &self.build, &self.test]
    }

    /// Target name of the first failed step, if any.
    pub fn failed_target(&self) -> Option<&str> {
        self.steps()
            .into_iter()
            .find(|step| step.ran && !step.success())
            .map(|step| step.target.as_str())
    }
}

fn targets(config: &BuildConfig) -> [&str; 3] {
    [
        config.protos_target.as_str(),
        config.build_target.as_str(),
        config.test_target.as_str(),
    ]
}

/// Results for a pipeline that skipped the build entirely.
pub fn skipped(config: &BuildConfig) -> BuildResults {
    let [protos, build, test] = targets(config).map(|t| BuildStep::skipped(&config.tool, t));
    BuildResults {
        protos,
        build,
        test,
        skipped: true,
    }
}

/// Run the configured targets in sequence, stopping at the first failure.
pub fn run(ctx: &RepoContext) -> BuildResults {
    let config = &ctx.layout.build;
    let mut failed = false;

    let [protos, build, test] = targets(config).map(|target| {
        if failed {
            return BuildStep::skipped(&config.tool, target);
        }

        log_status!("build", "Running {} {}...", config.tool, target);
        let output = run_captured(&config.tool, &[target], &ctx.root, &[]);
        if !output.success() {
            log_status!("build", "{} {} failed (exit {})", config.tool, target, output.exit_code);
            failed = true;
        }

        BuildStep {
            target: target.to_string(),
            command: display_command(&config.tool, &[target]),
            ran: true,
            output,
        }
    });

    BuildResults {
        protos,
        build,
        test,
        skipped: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoLayout;
    use tempfile::TempDir;

    fn ctx_with_tool(dir: &TempDir, tool: &str) -> RepoContext {
        let mut layout = RepoLayout::default();
        layout.build.tool = tool.to_string();
        RepoContext::with_layout(dir.path(), layout)
    }

    #[test]
    fn all_targets_run_when_tool_succeeds() {
        let dir = TempDir::new().unwrap();
        let results = run(&ctx_with_tool(&dir, "echo"));

        assert!(results.success());
        assert!(results.steps().iter().all(|s| s.ran));
        assert_eq!(results.test.output.stdout.trim(), "test");
        assert_eq!(results.failed_target(), None);
    }

    #[test]
    fn first_failure_stops_the_sequence() {
        let dir = TempDir::new().unwrap();
        let results = run(&ctx_with_tool(&dir, "false"));

        assert!(!results.success());
        assert!(results.protos.ran);
        assert!(!results.build.ran);
        assert!(!results.test.ran);
        assert_eq!(results.build.output.exit_code, 0);
        assert_eq!(results.failed_target(), Some("protos"));
    }

    #[test]
    fn missing_tool_reports_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let results = run(&ctx_with_tool(&dir, "kindctl-no-such-tool"));

        assert_eq!(results.protos.output.exit_code, 127);
        assert!(!results.build.ran);
    }

    #[test]
    fn skipped_results_are_not_successful() {
        let results = skipped(&BuildConfig::default());
        assert!(results.skipped);
        assert!(!results.success());
        assert_eq!(results.protos.command, "make protos");
    }
}
