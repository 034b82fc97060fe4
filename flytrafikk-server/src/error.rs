//! Startup error handling with user-friendly messages.
//!
//! Only startup can fail the process; once serving, data-path failures
//! are reported inside response bodies instead.

use std::fmt;
use std::io;
use std::process;

use flytrafikk::provider::ProviderError;

/// Errors that abort server startup.
#[derive(Debug)]
pub enum ServerError {
    /// Failed to initialize logging
    LoggingInit(io::Error),
    /// Failed to create the outbound HTTP client
    HttpClient(ProviderError),
    /// Failed to bind the listen address
    Bind { addr: String, error: io::Error },
    /// The accept loop failed
    Serve(io::Error),
}

impl ServerError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let ServerError::Bind { .. } = self {
            eprintln!();
            eprintln!("Is another instance already running on that port?");
        }

        process::exit(1)
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            ServerError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            ServerError::Bind { addr, error } => {
                write!(f, "Failed to bind '{}': {}", addr, error)
            }
            ServerError::Serve(e) => write!(f, "Server error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::LoggingInit(e) => Some(e),
            ServerError::HttpClient(e) => Some(e),
            ServerError::Bind { error, .. } => Some(error),
            ServerError::Serve(e) => Some(e),
        }
    }
}
