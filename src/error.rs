//! Error handling.

use std::fmt;
use std::io;

use winit::error::{EventLoopError, OsError};

use crate::version::GlVersion;

/// A specialized [`Result`] type for the program.
pub type Result<T> = std::result::Result<T, Error>;

/// Process status for the startup GL checks, the `-1` of a C `exit` call.
pub const GL_FAILURE_EXIT_CODE: u8 = 255;

/// Process status for window system failures.
pub const WINDOW_FAILURE_EXIT_CODE: u8 = 1;

/// Everything that stops the program.
#[derive(Debug)]
pub enum Error {
    /// The loader could not determine an OpenGL version.
    Loader,

    /// The loaded OpenGL version lacks the 2.0 feature set.
    Capability {
        /// The version that was loaded.
        version: GlVersion,
    },

    /// Window creation or a window system handle failed.
    Window(String),

    /// Display, config, context or surface failure.
    Context(glutin::error::Error),

    /// The event loop could not be created or run.
    EventLoop(EventLoopError),

    /// Writing the report failed.
    Io(io::Error),
}

impl Error {
    /// Whether the error comes from the startup OpenGL checks.
    pub fn is_gl_failure(&self) -> bool {
        matches!(self, Error::Loader | Error::Capability { .. })
    }

    /// The process exit status for this error. Never `0`.
    pub fn exit_code(&self) -> u8 {
        if self.is_gl_failure() {
            GL_FAILURE_EXIT_CODE
        } else {
            WINDOW_FAILURE_EXIT_CODE
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Loader => f.write_str("Something went wrong!"),
            Error::Capability { .. } => f.write_str("Your system doesn't support OpenGL >= 2!"),
            Error::Window(msg) => write!(f, "window creation failed: {msg}"),
            Error::Context(err) => write!(f, "OpenGL context failure: {err}"),
            Error::EventLoop(err) => write!(f, "event loop failure: {err}"),
            Error::Io(err) => write!(f, "failed to write report: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Context(err) => Some(err),
            Error::EventLoop(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<glutin::error::Error> for Error {
    fn from(err: glutin::error::Error) -> Self {
        Error::Context(err)
    }
}

impl From<EventLoopError> for Error {
    fn from(err: EventLoopError) -> Self {
        Error::EventLoop(err)
    }
}

impl From<OsError> for Error {
    fn from(err: OsError) -> Self {
        Error::Window(err.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// `glutin-winit` reports bootstrapping failures as boxed errors.
impl From<Box<dyn std::error::Error>> for Error {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        Error::Window(err.to_string())
    }
}
