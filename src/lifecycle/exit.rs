//! Translation of the lifecycle outcome into a process exit status.

use std::fmt::Display;
use std::process::ExitCode;

/// Exit status and stderr message for a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    /// Process exit code.
    pub code: u8,
    /// Line to print on stderr, if any.
    pub message: Option<String>,
}

impl Exit {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;

    /// Map a terminal outcome to an exit status.
    pub fn from_outcome<T, E: Display>(outcome: &Result<T, E>) -> Self {
        match outcome {
            Ok(_) => Self {
                code: Self::SUCCESS,
                message: None,
            },
            Err(e) => Self {
                code: Self::FAILURE,
                message: Some(format!("error: {}", e)),
            },
        }
    }

    /// Whether this is a successful exit.
    pub fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }

    /// Print the message to stderr and hand back the exit code.
    pub fn report(self) -> ExitCode {
        if let Some(message) = &self.message {
            eprintln!("{}", message);
        }
        ExitCode::from(self.code)
    }
}
