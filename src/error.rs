//! Error handling for spotcontrol.
//!
//! Every fallible operation returns an [`struct@Error`]: a category from the
//! gRPC status code set plus the underlying error.
//!
//! # Error Categories
//!
//! The controller reports three families of failures:
//! * Encoding of outbound frames -> `Internal`
//! * Decoding of inbound frames -> `DataLoss`
//! * Transport failures -> whatever kind the session reports, usually
//!   `Unavailable` or `Aborted`
//!
//! Invalid caller input such as malformed track ids maps to `InvalidArgument`.
//!
//! # Example
//!
//! ```rust
//! use spotcontrol::error::{Error, ErrorKind, Result};
//!
//! fn check_username(username: &str) -> Result<()> {
//!     if username.is_empty() {
//!         return Err(Error::invalid_argument("username should not be empty"));
//!     }
//!
//!     Ok(())
//! }
//! ```

#![allow(clippy::enum_glob_use)]

use std::fmt;
use thiserror::Error;

/// Error kind together with the error that caused it.
#[derive(Debug)]
pub struct Error {
    /// Classification of the error
    pub kind: ErrorKind,

    /// Details of the underlying error
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

impl Error {
    /// Returns the underlying error if it is of type `E`.
    ///
    /// # Example
    /// ```
    /// use std::io;
    ///
    /// let error = Error::from(io::Error::new(io::ErrorKind::NotFound, "spotcontrol.toml"));
    /// assert!(error.downcast::<io::Error>().is_some());
    /// ```
    #[must_use]
    pub fn downcast<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.error.downcast_ref::<E>()
    }
}

/// Standard result type for spotcontrol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories, numbered after the gRPC status codes.
///
/// See [gRPC status codes](https://github.com/googleapis/googleapis/blob/master/google/rpc/code.proto)
/// for the original definitions.
#[expect(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u32)]
pub enum ErrorKind {
    #[error("operation was cancelled")]
    Cancelled = 1,

    #[error("unknown error")]
    Unknown = 2,

    /// Bad caller input, such as a malformed track id or a missing username.
    #[error("invalid argument specified")]
    InvalidArgument = 3,

    #[error("operation timed out")]
    DeadlineExceeded = 4,

    #[error("not found")]
    NotFound = 5,

    #[error("attempt to create what already exists")]
    AlreadyExists = 6,

    #[error("permission denied")]
    PermissionDenied = 7,

    #[error("no valid authentication credentials")]
    Unauthenticated = 16,

    /// Sequence numbers ran out.
    #[error("resource has been exhausted")]
    ResourceExhausted = 8,

    #[error("invalid state")]
    FailedPrecondition = 9,

    /// The transport dropped a request midway.
    #[error("operation aborted")]
    Aborted = 10,

    #[error("out of range")]
    OutOfRange = 11,

    /// The session does not offer the requested operation.
    #[error("not implemented")]
    Unimplemented = 12,

    /// An outbound frame could not be encoded.
    #[error("internal error")]
    Internal = 13,

    /// The transport is not connected.
    #[error("service unavailable")]
    Unavailable = 14,

    /// An inbound frame could not be decoded.
    #[error("unrecoverable data loss or corruption")]
    DataLoss = 15,
}

macro_rules! constructors {
    ($($(#[$doc:meta])* $name:ident => $kind:ident,)+) => {
        impl Error {
            /// Creates a new error with specified kind and details.
            ///
            /// # Examples
            ///
            /// ```rust
            /// let err = Error::new(ErrorKind::NotFound, "no such device");
            /// assert_eq!(err.kind, ErrorKind::NotFound);
            /// ```
            pub fn new<E>(kind: ErrorKind, error: E) -> Self
            where
                E: Into<Box<dyn std::error::Error + Send + Sync>>,
            {
                Self {
                    kind,
                    error: error.into(),
                }
            }

            $(
                $(#[$doc])*
                pub fn $name<E>(error: E) -> Self
                where
                    E: Into<Box<dyn std::error::Error + Send + Sync>>,
                {
                    Self::new(ErrorKind::$kind, error)
                }
            )+
        }
    };
}

constructors! {
    /// Creates an `Aborted` error, for example when the connection was
    /// reset while sending.
    aborted => Aborted,
    already_exists => AlreadyExists,
    /// Creates a `Cancelled` error, for example when a task was cancelled
    /// before it completed.
    cancelled => Cancelled,
    /// Creates a `DataLoss` error for inbound data that cannot be decoded.
    data_loss => DataLoss,
    deadline_exceeded => DeadlineExceeded,
    failed_precondition => FailedPrecondition,
    /// Creates an `Internal` error for broken invariants, such as a frame
    /// that cannot be encoded.
    internal => Internal,
    /// Creates an `InvalidArgument` error for bad caller input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let err = Error::invalid_argument("track id should not be empty");
    /// assert_eq!(err.kind, ErrorKind::InvalidArgument);
    /// ```
    invalid_argument => InvalidArgument,
    not_found => NotFound,
    /// Creates an `OutOfRange` error, for example for oversized files.
    out_of_range => OutOfRange,
    permission_denied => PermissionDenied,
    /// Creates a `ResourceExhausted` error when a finite resource such as
    /// the sequence number space is used up.
    resource_exhausted => ResourceExhausted,
    unauthenticated => Unauthenticated,
    /// Creates an `Unavailable` error when the transport cannot be reached.
    unavailable => Unavailable,
    /// Creates an `Unimplemented` error for operations a session does not
    /// support.
    unimplemented => Unimplemented,
    unknown => Unknown,
}

/// Allows error chains to be examined for root causes.
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

/// Formats the error as `{kind}: {details}`.
impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}: {}", self.kind, self.error)
    }
}

/// Converts IO errors into appropriate error kinds.
///
/// * `NotFound` -> `NotFound`
/// * `PermissionDenied` -> `PermissionDenied`
/// * `ConnectionReset` -> `Aborted`
/// * etc.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind::*;
        match err.kind() {
            NotFound => Self::not_found(err),
            PermissionDenied => Self::permission_denied(err),
            AddrInUse | AlreadyExists => Self::already_exists(err),
            AddrNotAvailable | ConnectionRefused | NotConnected => Self::unavailable(err),
            BrokenPipe | ConnectionReset | ConnectionAborted => Self::aborted(err),
            Interrupted | WouldBlock => Self::cancelled(err),
            UnexpectedEof => Self::data_loss(err),
            TimedOut => Self::deadline_exceeded(err),
            InvalidInput | InvalidData => Self::invalid_argument(err),
            WriteZero => Self::resource_exhausted(err),
            _ => Self::unknown(err),
        }
    }
}

/// Converts configuration file parsing errors to `InvalidArgument`.
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::invalid_argument(e)
    }
}

/// Converts task join errors into appropriate error kinds.
///
/// * Cancelled tasks -> `Cancelled`
/// * Panicked tasks -> `Internal`
impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        if e.is_cancelled() {
            Self::cancelled(e.to_string())
        } else {
            Self::internal(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_kind_and_details() {
        let err = Error::invalid_argument("track id should not be empty");
        assert_eq!(
            err.to_string(),
            "invalid argument specified: track id should not be empty"
        );
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(Error::data_loss("x").kind, ErrorKind::DataLoss);
        assert_eq!(Error::internal("x").kind, ErrorKind::Internal);
        assert_eq!(
            Error::resource_exhausted("x").kind,
            ErrorKind::ResourceExhausted
        );
        assert_eq!(ErrorKind::Unavailable as u32, 14);
    }

    #[test]
    fn io_errors_map_to_kinds() {
        let err = Error::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "spotcontrol.toml",
        ));
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = Error::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "peer went away",
        ));
        assert_eq!(err.kind, ErrorKind::Aborted);
    }

    #[test]
    fn downcast_returns_source() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "oh no!"));
        assert!(err.downcast::<std::io::Error>().is_some());
        assert!(err.downcast::<toml::de::Error>().is_none());
    }
}
