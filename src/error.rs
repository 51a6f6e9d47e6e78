//! Process exit status and the JSON error shape printed with `--json-errors`.

use std::fmt;

use serde::Serialize;

/// How a run ended, as seen by scripts.
///
/// | value | code  | meaning                                        |
/// |-------|-------|------------------------------------------------|
/// | 0     | CS000 | every source read and at least one code found  |
/// | 1     | CS001 | the run aborted                                |
/// | 2     | CS002 | the run finished without finding any code      |
/// | 3     | CS003 | codes found, but some sources or items skipped |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Clean run.
    Success = 0,
    /// Aborted run.
    GeneralError = 1,
    /// Nothing matched.
    NoCodes = 2,
    /// Report written from incomplete input.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Value handed to [`std::process::exit`].
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Stable `CSnnn` identifier.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Success => "CS000",
            Self::GeneralError => "CS001",
            Self::NoCodes => "CS002",
            Self::PartialSuccess => "CS003",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An aborted run, serialized for machine consumers.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// `CSnnn` identifier
    pub code: String,
    /// Process exit status
    pub exit_code: i32,
    /// Outermost context message
    pub message: String,
    /// Underlying causes, outermost first
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Flatten an error chain.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        let mut chain = err.chain().map(ToString::to_string);
        Self {
            code: exit_code.code().to_owned(),
            exit_code: exit_code.as_i32(),
            message: chain.next().unwrap_or_default(),
            causes: chain.collect(),
        }
    }
}
