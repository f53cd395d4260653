//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use navcanvas::coord::CoordError;
use navcanvas::engine::EngineError;
use navcanvas::provider::ProviderError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Invalid coordinates or zoom on the command line
    Coord(CoordError),
    /// Engine rejected a request
    Engine(EngineError),
    /// Failed to construct the tile provider
    Provider(ProviderError),
    /// Not every tile arrived before the deadline
    SnapshotTimeout { loaded: usize, expected: usize },
    /// Failed to write the output image
    FileWrite {
        path: String,
        error: image::ImageError,
    },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::SnapshotTimeout { .. } => {
                eprintln!();
                eprintln!("Some tiles never arrived. Possible causes:");
                eprintln!("  1. The tile server is slow or unreachable");
                eprintln!("  2. The URL template points at a non-existent layer");
                eprintln!("  3. The zoom level is not served for this area");
            }
            CliError::Provider(ProviderError::InvalidUrlTemplate(_)) => {
                eprintln!();
                eprintln!("The template must contain {{x}}, {{y}} and {{z}} placeholders,");
                eprintln!("e.g. https://tile.example.org/{{z}}/{{x}}/{{y}}.png");
            }
            _ => {}
        }

        process::exit(1);
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(error) => write!(f, "failed to initialize logging: {}", error),
            CliError::Coord(error) => write!(f, "{}", error),
            CliError::Engine(error) => write!(f, "{}", error),
            CliError::Provider(error) => write!(f, "{}", error),
            CliError::SnapshotTimeout { loaded, expected } => {
                write!(
                    f,
                    "snapshot timed out with {}/{} tiles loaded",
                    loaded, expected
                )
            }
            CliError::FileWrite { path, error } => {
                write!(f, "failed to write '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<CoordError> for CliError {
    fn from(error: CoordError) -> Self {
        CliError::Coord(error)
    }
}

impl From<EngineError> for CliError {
    fn from(error: EngineError) -> Self {
        CliError::Engine(error)
    }
}

impl From<ProviderError> for CliError {
    fn from(error: ProviderError) -> Self {
        CliError::Provider(error)
    }
}
