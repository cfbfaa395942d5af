//! Top-level error types for the `create-dmg` command.

use thiserror::Error;

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all command operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors resolving paths against the working directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// The host cannot create disk images
    #[error("macOS only")]
    UnsupportedPlatform,
}

impl BundlerError {
    /// Process exit code for this error.
    ///
    /// `2` means the image was written but could not be signed.
    pub fn exit_code(&self) -> i32 {
        match self {
            BundlerError::Bundler(crate::bundler::Error::Signing(_)) => 2,
            _ => 1,
        }
    }

    /// Actionable hints for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error;

        match self {
            BundlerError::Bundler(Error::TargetExists(_)) => {
                vec!["Pass --overwrite or choose another destination".to_string()]
            }
            BundlerError::Bundler(Error::Signing(_)) => vec![
                "Pass --identity with a valid signing identity".to_string(),
                "Or pass --no-code-sign to skip signing".to_string(),
            ],
            BundlerError::Bundler(Error::Icon(_)) => {
                vec!["Pass --no-icon-composition to use the default volume icon".to_string()]
            }
            BundlerError::Bundler(Error::CommandFailed { .. }) => {
                vec!["Install the Xcode command line tools: xcode-select --install".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn signing_failure_exits_with_two() {
        let err = BundlerError::from(crate::bundler::Error::Signing("no identity".into()));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with("Code signing failed. The DMG is fine, just not code signed."));
        assert_eq!(err.recovery_suggestions().len(), 2);
    }

    #[test]
    fn other_failures_exit_with_one() {
        let err = BundlerError::from(crate::bundler::Error::TargetExists(PathBuf::from("A 1.0.dmg")));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(BundlerError::from(CliError::UnsupportedPlatform).exit_code(), 1);
        assert_eq!(
            BundlerError::from(CliError::UnsupportedPlatform).to_string(),
            "CLI error: macOS only"
        );
    }

    #[test]
    fn working_directory_errors_are_io_errors() {
        fn resolve() -> Result<PathBuf> {
            let cwd: std::io::Result<PathBuf> = Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cwd removed",
            ));
            Ok(cwd?)
        }
        let err = resolve().unwrap_err();
        assert!(matches!(err, BundlerError::Io(_)));
        assert_eq!(err.to_string(), "IO error: cwd removed");
        assert_eq!(err.exit_code(), 1);
    }
}
