/// The respawn loop: relaunch the target command for as long as each run ends
/// in a clean zero exit.
use tracing::{debug, error};

use crate::child::{self, Termination};
use crate::exit_code::ExitCode;

/// Run the supervision loop to completion and report the supervisor's own
/// exit code.
///
/// The returned code reflects the supervisor's operational health, never the
/// child's exit status: any definite child termination — nonzero exit, signal
/// death, exec failure, even the "unknown" case — ends the loop with `Ok`.
/// Only process-creation failure and losing the child produce a non-`Ok`
/// code, and neither is ever retried.
///
/// The original design's loop condition read as "respawn after any definite
/// termination"; the respawn predicate here is deliberately the stricter
/// clean-exit-only one, which is what makes a crashing child stop the loop
/// after exactly one run.
pub fn supervise(command: &[String]) -> ExitCode {
    let Some((program, args)) = command.split_first() else {
        eprintln!("Usage: respawn <program> [program_args...]");
        return ExitCode::IncorrectUsage;
    };

    loop {
        match child::run_once(program, args) {
            // A clean exit is the only outcome that earns a relaunch.
            Ok(Termination::Exited(0)) => {
                debug!(%program, "child exited cleanly, respawning");
            }
            Ok(_) => return ExitCode::Ok,
            Err(err) => {
                error!(%err, "supervision aborted");
                return err.exit_code();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    fn run_count(counter: &Path) -> usize {
        std::fs::read_to_string(counter)
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    #[test]
    fn test_empty_command_is_incorrect_usage() {
        assert_eq!(supervise(&[]), ExitCode::IncorrectUsage);
    }

    #[test]
    fn test_nonzero_first_exit_spawns_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("runs");
        let script = format!("echo run >> {}; exit 3", counter.display());

        assert_eq!(supervise(&sh(&script)), ExitCode::Ok);
        assert_eq!(run_count(&counter), 1);
    }

    #[test]
    fn test_respawns_until_first_unclean_exit() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("runs");
        // Exits 0 on the first two runs, 1 on the third
        let script = format!(
            "echo run >> {c}; [ $(wc -l < {c}) -ge 3 ] && exit 1; exit 0",
            c = counter.display()
        );

        assert_eq!(supervise(&sh(&script)), ExitCode::Ok);
        assert_eq!(run_count(&counter), 3);
    }

    #[test]
    fn test_signal_death_stops_the_loop_with_ok() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("runs");
        let script = format!("echo run >> {}; kill -KILL $$", counter.display());

        assert_eq!(supervise(&sh(&script)), ExitCode::Ok);
        assert_eq!(run_count(&counter), 1);
    }

    #[test]
    fn test_nonexistent_program_is_ordinary_unclean_exit() {
        let command = vec!["definitely-not-a-real-binary-xyz".to_string()];
        assert_eq!(supervise(&command), ExitCode::Ok);
    }

    #[test]
    fn test_runs_are_deterministic() {
        // Same fixture, two fresh runs: same spawn count, same final code
        for _ in 0..2 {
            let dir = tempfile::tempdir().unwrap();
            let counter = dir.path().join("runs");
            let script = format!(
                "echo run >> {c}; [ $(wc -l < {c}) -ge 2 ] && exit 9; exit 0",
                c = counter.display()
            );

            assert_eq!(supervise(&sh(&script)), ExitCode::Ok);
            assert_eq!(run_count(&counter), 2);
        }
    }
}
