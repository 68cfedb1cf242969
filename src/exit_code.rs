/// Exit codes returned by the supervisor itself.
///
/// The set is closed: callers script against these numbers, so variants are
/// kept even when the current control flow cannot produce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Supervision loop ran and stopped without an internal fault. Says
    /// nothing about the child's own exit status.
    Ok = 0,
    /// Logic-defect sentinel; must never be the final code.
    #[allow(dead_code)]
    UnknownError = 1,
    /// The OS refused to create the child process.
    ForkFailure = 2,
    /// The child could not load the target program image. Observable as the
    /// child's own exit status, never as the supervisor's.
    ExecFailure = 3,
    /// The wait call failed in a way that is neither "child lost" nor a
    /// retryable interruption.
    WaitFailure = 4,
    /// No target program was given on the command line.
    IncorrectUsage = 5,
    /// The OS no longer reports the child as ours.
    ChildLost = 6,
}

impl ExitCode {
    /// Numeric value handed to the OS on exit.
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_contract_is_stable() {
        assert_eq!(ExitCode::Ok.code(), 0);
        assert_eq!(ExitCode::UnknownError.code(), 1);
        assert_eq!(ExitCode::ForkFailure.code(), 2);
        assert_eq!(ExitCode::ExecFailure.code(), 3);
        assert_eq!(ExitCode::WaitFailure.code(), 4);
        assert_eq!(ExitCode::IncorrectUsage.code(), 5);
        assert_eq!(ExitCode::ChildLost.code(), 6);
    }
}
