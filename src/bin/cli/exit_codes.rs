//! Exit codes for the CLI tool.

use repkg::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Run completed but some entries failed (fail-soft)
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Invalid command line arguments or configuration
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadArchive,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a repkg error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::CorruptArchive { .. } => ExitCode::BadArchive,
        Error::UnsupportedFeature { .. } => ExitCode::BadArchive,
        Error::InvalidName(_) => ExitCode::FatalError,
        Error::MalformedText { .. } => ExitCode::FatalError,
        Error::InvalidPattern(_) | Error::InvalidRule(_) | Error::Config(_) => ExitCode::BadArgs,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
