//! Application error type shared by every timetable crate.
//!
//! An [`AppError`] pairs an [`ErrorKind`] with the underlying
//! [`anyhow::Error`]. Callers match on the kind to decide how to surface the
//! failure; the wrapped error carries the human-readable reason.

use anyhow::Error;
use std::fmt;

/// Broad failure categories for schedule operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field was missing or malformed before any work started.
    Input,
    /// A row or cell of an imported sheet could not be interpreted.
    Validation,
    /// The (teacher, subject) pairing is not present in the master list.
    Authorization,
    /// The record store rejected a read or write.
    Persistence,
    /// The referenced record does not exist.
    NotFound,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Input => "input",
            ErrorKind::Validation => "validation",
            ErrorKind::Authorization => "authorization",
            ErrorKind::Persistence => "persistence",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn input<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Input, err)
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn authorization<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Authorization, err)
    }

    pub fn persistence<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Persistence, err)
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.error)
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(AppError::input(anyhow::anyhow!("x")).kind, ErrorKind::Input);
        assert_eq!(
            AppError::authorization(anyhow::anyhow!("x")).kind,
            ErrorKind::Authorization
        );
        assert_eq!(
            AppError::persistence(anyhow::anyhow!("x")).kind,
            ErrorKind::Persistence
        );
        assert_eq!(
            AppError::not_found(anyhow::anyhow!("x")).kind,
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_from_io_error_is_internal() {
        let io = std::io::Error::other("disk on fire");
        let err: AppError = io.into();
        assert!(err.is(ErrorKind::Internal));
        assert!(err.error.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::authorization(anyhow::anyhow!("Budi may not teach Kimia"));
        assert_eq!(
            err.to_string(),
            "authorization error: Budi may not teach Kimia"
        );
    }
}
