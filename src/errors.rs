use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Custom error type for knot
#[derive(Debug)]
pub enum Error {
    /// Error related to file operations
    FileOperation {
        source: io::Error,
        path: PathBuf,
        operation: String,
    },
    /// A registry entry, template or batch could not be found
    NotFound { what: String, detail: String },
    /// No registered project encloses the working directory
    NotInProject { path: PathBuf },
    /// A batch or directory that should be fresh already exists
    AlreadyExists { path: PathBuf },
    /// No open action is registered for the extension
    UnsupportedFileType { extension: String },
    /// An external program could not be spawned or exited unsuccessfully
    ExternalTool { program: String, detail: String },
    /// Error related to configuration, registry or scratch file parsing
    ConfigParsing {
        source: Box<dyn StdError + Send + Sync>,
        detail: String,
    },
    /// Error related to path operations
    PathOperation { path: PathBuf, operation: String },
    /// Error when a filename is not valid Unicode
    InvalidFilename { path: PathBuf },
    /// Generic error with a message
    Generic { message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FileOperation {
                path, operation, ..
            } => {
                write!(f, "Failed to {} file: {}", operation, path.display())
            }
            Error::NotFound { what, detail } => {
                write!(f, "No {what} found: {detail}")
            }
            Error::NotInProject { path } => {
                write!(
                    f,
                    "Working directory is not part of a project: {}",
                    path.display()
                )
            }
            Error::AlreadyExists { path } => {
                write!(f, "Directory already exists: {}", path.display())
            }
            Error::UnsupportedFileType { extension } => {
                write!(f, "Extension '{extension}' is unsupported")
            }
            Error::ExternalTool { program, detail } => {
                write!(f, "External program '{program}' failed: {detail}")
            }
            Error::ConfigParsing { detail, .. } => {
                write!(f, "Configuration parsing error: {detail}")
            }
            Error::PathOperation { path, operation } => {
                write!(f, "Failed to {} path: {}", operation, path.display())
            }
            Error::InvalidFilename { path } => {
                write!(f, "Filename is not valid unicode: {}", path.display())
            }
            Error::Generic { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::FileOperation { source, .. } => Some(source),
            Error::ConfigParsing { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::FileOperation {
            source: err,
            path: PathBuf::new(),
            operation: "perform operation on".to_string(),
        }
    }
}

/// Custom Result type for knot
///
/// # Examples
/// ```
/// use knot::errors::{generic_error, Result};
///
/// fn example_function() -> Result<String> {
///     // Return success
///     Ok("success".to_string())
///
///     // Or return an error
///     // Err(generic_error("Something went wrong"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Helper function to create a file operation error
pub fn file_operation_error(err: io::Error, path: PathBuf, operation: &str) -> Error {
    Error::FileOperation {
        source: err,
        path,
        operation: operation.to_string(),
    }
}

/// Helper function to create a not-found error
pub fn not_found_error(what: &str, detail: &str) -> Error {
    Error::NotFound {
        what: what.to_string(),
        detail: detail.to_string(),
    }
}

pub fn not_in_project_error(path: PathBuf) -> Error {
    Error::NotInProject { path }
}

pub fn already_exists_error(path: PathBuf) -> Error {
    Error::AlreadyExists { path }
}

pub fn unsupported_file_type_error(extension: &str) -> Error {
    Error::UnsupportedFileType {
        extension: extension.to_string(),
    }
}

/// Helper function to create an external tool error
pub fn external_tool_error(program: &str, detail: &str) -> Error {
    Error::ExternalTool {
        program: program.to_string(),
        detail: detail.to_string(),
    }
}

/// Helper function to create a config parsing error
pub fn config_parsing_error<E: StdError + Send + Sync + 'static>(err: E, detail: &str) -> Error {
    Error::ConfigParsing {
        source: Box::new(err),
        detail: detail.to_string(),
    }
}

/// Helper function to create a path operation error
pub fn path_operation_error(path: PathBuf, operation: &str) -> Error {
    Error::PathOperation {
        path,
        operation: operation.to_string(),
    }
}

/// Helper function to create an invalid filename error
pub fn invalid_filename_error(path: PathBuf) -> Error {
    Error::InvalidFilename { path }
}

/// Helper function to create a generic error
pub fn generic_error(message: &str) -> Error {
    Error::Generic {
        message: message.to_string(),
    }
}
