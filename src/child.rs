/// Single supervision iteration: spawn the target command, then block until
/// the OS reports what became of that specific child.
use std::io;
use std::process::Command;
use std::thread;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;
use tracing::{error, info, warn};

use crate::exit_code::ExitCode;

/// Pause between re-waits while the child sits in a stopped state
/// (e.g. a debugger attached to it).
const STOPPED_RECHECK: Duration = Duration::from_millis(100);

/// Why the wait call returned for the supervised child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Child exited with this status code.
    Exited(i32),
    /// Child was killed by this signal.
    Signaled(i32),
    /// Child is suspended, not terminated. Non-terminal: the wait loop logs
    /// and keeps waiting.
    Stopped,
    /// Neither exited, signaled, nor stopped per the OS. Should not normally
    /// occur; treated as a definite termination.
    Unknown,
}

/// Errors that abort supervision outright, as opposed to child outcomes that
/// merely end one iteration.
#[derive(Debug)]
pub enum ChildError {
    /// The OS refused to create the child process.
    Spawn { source: io::Error },
    /// The wait call failed with something other than ECHILD or EINTR.
    Wait { errno: Errno },
    /// The wait call reported the child is no longer ours (ECHILD) without
    /// us having observed its termination.
    ChildLost,
}

impl std::fmt::Display for ChildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChildError::Spawn { source } => {
                write!(f, "failed to create child process: {}", source)
            }
            ChildError::Wait { errno } => {
                write!(f, "wait for child failed: {}", errno)
            }
            ChildError::ChildLost => {
                write!(f, "lost track of the child process")
            }
        }
    }
}

impl std::error::Error for ChildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChildError::Spawn { source } => Some(source),
            ChildError::Wait { .. } | ChildError::ChildLost => None,
        }
    }
}

impl ChildError {
    /// The exit code the supervisor propagates for this failure.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ChildError::Spawn { .. } => ExitCode::ForkFailure,
            ChildError::Wait { .. } => ExitCode::WaitFailure,
            ChildError::ChildLost => ExitCode::ChildLost,
        }
    }
}

/// Errnos `execvp` reports when the target image cannot be loaded, as opposed
/// to the process itself failing to come into existence.
fn is_exec_errno(errno: Errno) -> bool {
    matches!(
        errno,
        Errno::ENOENT
            | Errno::EACCES
            | Errno::ENOEXEC
            | Errno::ENOTDIR
            | Errno::ELOOP
            | Errno::E2BIG
            | Errno::ENAMETOOLONG
    )
}

/// Map an OS wait status onto a termination report.
fn classify(status: WaitStatus) -> Termination {
    match status {
        WaitStatus::Exited(_, code) => Termination::Exited(code),
        WaitStatus::Signaled(_, signal, _) => Termination::Signaled(signal as i32),
        WaitStatus::Stopped(_, _) => Termination::Stopped,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        WaitStatus::PtraceEvent(_, _, _) | WaitStatus::PtraceSyscall(_) => Termination::Stopped,
        _ => Termination::Unknown,
    }
}

/// Spawn the target program and block until it definitively terminates.
///
/// The program is resolved through PATH when given as a bare name, and the
/// child inherits the supervisor's environment and stdio unchanged.
///
/// A child that cannot load the target image is not a supervisor error: it is
/// reported as the child exiting with `ExitCode::ExecFailure`, the same way
/// the wait step would observe it. Only process-creation failure and losing
/// the child abort supervision.
pub fn run_once(program: &str, args: &[String]) -> Result<Termination, ChildError> {
    let child = match Command::new(program).args(args).spawn() {
        Ok(child) => child,
        Err(err) => {
            let errno = err.raw_os_error().map(Errno::from_raw);
            if errno.is_some_and(is_exec_errno) {
                error!(program, %err, "unable to exec target program");
                return Ok(Termination::Exited(ExitCode::ExecFailure.code()));
            }
            error!(%err, "unable to create child process");
            return Err(ChildError::Spawn { source: err });
        }
    };

    let pid = Pid::from_raw(child.id() as i32);
    info!(%pid, "child is running");

    loop {
        match waitpid(pid, None) {
            Ok(status) => match classify(status) {
                Termination::Exited(code) => {
                    info!(code, "child exited");
                    return Ok(Termination::Exited(code));
                }
                Termination::Signaled(signal) => {
                    warn!(signal, "child died to signal");
                    return Ok(Termination::Signaled(signal));
                }
                Termination::Stopped => {
                    // Never give up on a child that is merely suspended;
                    // re-wait until it terminates for real.
                    info!(%pid, "child is stopped");
                    thread::sleep(STOPPED_RECHECK);
                }
                Termination::Unknown => {
                    warn!(?status, "child ended for an unknown reason");
                    return Ok(Termination::Unknown);
                }
            },
            Err(Errno::ECHILD) => {
                error!(%pid, "lost track of the child process");
                return Err(ChildError::ChildLost);
            }
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                error!(%errno, %pid, "wait for child failed");
                return Err(ChildError::Wait { errno });
            }
        }
    }
}
