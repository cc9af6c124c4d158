//! Error types for nanopb-helpers.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Output longer than this is truncated when an error is displayed.
const MAX_OUTPUT_LEN: usize = 1000;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the external compilers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host OS identifier is not one we can build an invocation for.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
    /// The `.proto` schema does not exist or is not a file.
    #[error("schema not found: {}", .0.display())]
    SchemaNotFound(PathBuf),
    /// The generator options file does not exist or is not a file.
    #[error("options file not found: {}", .0.display())]
    OptionsNotFound(PathBuf),
    /// An external tool could not be run or exited unsuccessfully.
    #[error("{tool} failed ({failure}): {}", .argv.join(" "))]
    Compiler {
        tool: Tool,
        argv: Vec<String>,
        failure: Failure,
    },
    /// A tool reported success but left no file matching `pattern`.
    #[error("no generated file matching `{pattern}` in {}", .dir.display())]
    ArtifactNotFound { pattern: String, dir: PathBuf },
    /// More than one generated file matched where exactly one was expected.
    #[error("expected one file matching `{pattern}`, found: {}", .candidates.join(", "))]
    AmbiguousArtifact {
        pattern: String,
        candidates: Vec<String>,
    },
    /// The generated source does not include the header we predicted.
    #[error("generated source never includes `{include}`")]
    SelfIncludeMissing { include: String },
    /// Removing the temporary workspace failed.
    #[error("failed to remove workspace {}: {source}", .path.display())]
    WorkspaceCleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Invalid file pattern.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The broad kind of remediation an [`Error`] calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The host is missing something: a platform, a binary, disk access.
    Environment,
    /// The caller's schema or options were rejected.
    Input,
    /// A tool claimed success but its output broke our assumptions.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::Input => write!(f, "input"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

impl Error {
    /// Classify this error for reporting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SchemaNotFound(_) | Self::OptionsNotFound(_) => ErrorCategory::Input,
            Self::Compiler {
                failure: Failure::Exit { .. },
                ..
            } => ErrorCategory::Input,
            Self::ArtifactNotFound { .. }
            | Self::AmbiguousArtifact { .. }
            | Self::SelfIncludeMissing { .. }
            | Self::Pattern(_) => ErrorCategory::Internal,
            Self::UnsupportedPlatform(_)
            | Self::Compiler { .. }
            | Self::WorkspaceCleanup { .. }
            | Self::Io(_) => ErrorCategory::Environment,
        }
    }
}

/// External tools driven by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Protoc,
    NanopbGenerator,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protoc => write!(f, "protoc"),
            Self::NanopbGenerator => write!(f, "nanopb_generator"),
        }
    }
}

/// Why a tool invocation failed.
#[derive(Debug)]
pub enum Failure {
    /// The process ran and exited unsuccessfully. `code` is `None` when it
    /// was killed by a signal.
    Exit { code: Option<i32>, output: String },
    /// The executable could not be located.
    NotFound,
    /// The process could not be spawned or waited on.
    Launch(io::Error),
    /// The process outlived the configured timeout and was killed.
    Timeout(Duration),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exit { code, output } => {
                match code {
                    Some(code) => write!(f, "exit code {}", code)?,
                    None => write!(f, "terminated by signal")?,
                }
                let output = output.trim();
                if output.is_empty() {
                    Ok(())
                } else if output.len() > MAX_OUTPUT_LEN {
                    let mut end = MAX_OUTPUT_LEN;
                    while !output.is_char_boundary(end) {
                        end -= 1;
                    }
                    write!(f, ": {}... (truncated)", &output[..end])
                } else {
                    write!(f, ": {}", output)
                }
            }
            Self::NotFound => write!(f, "executable not found"),
            Self::Launch(e) => write!(f, "could not launch: {}", e),
            Self::Timeout(limit) => write!(f, "timed out after {:?}", limit),
        }
    }
}
